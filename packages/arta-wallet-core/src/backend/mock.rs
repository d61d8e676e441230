//! Recording backend for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BackendClient, BackendConnector, UserProfile, UserSession};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::identity::{DerivedIdentity, Principal};

/// One observed backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Connect { principal: String, canister_id: String },
    FetchRootKey,
    CreateSession { principal: String, user_agent: String },
    UpdateActivity { session_id: String },
    EndSession { session_id: String },
    GetUser { principal: String },
}

/// Knobs for failure and latency injection
#[derive(Debug, Default)]
pub(crate) struct Behavior {
    pub fail_connect: bool,
    pub fail_create_session: bool,
    pub fail_get_user: bool,
    pub connect_delay: Option<Duration>,
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<Call>>,
    behavior: Mutex<Behavior>,
    next_session: AtomicU64,
}

impl MockState {
    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

/// Connector that records every call and hands out mock clients
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut Behavior)) {
        f(&mut self.state.behavior.lock());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl BackendConnector for MockConnector {
    async fn connect(
        &self,
        backend: &BackendConfig,
        identity: Option<&DerivedIdentity>,
    ) -> Result<Arc<dyn BackendClient>> {
        let principal = identity
            .map(|i| i.principal().clone())
            .unwrap_or_else(Principal::anonymous);
        self.state.record(Call::Connect {
            principal: principal.to_text(),
            canister_id: backend.canister_id.clone(),
        });

        let (delay, fail) = {
            let behavior = self.state.behavior.lock();
            (behavior.connect_delay, behavior.fail_connect)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::BackendConnectionFailed("mock connect failure".into()));
        }

        Ok(Arc::new(MockClient {
            principal,
            state: self.state.clone(),
        }))
    }

    async fn fetch_root_key(&self, _client: &dyn BackendClient) -> Result<()> {
        self.state.record(Call::FetchRootKey);
        Ok(())
    }
}

struct MockClient {
    principal: Principal,
    state: Arc<MockState>,
}

impl MockClient {
    fn session(&self, session_id: String, ip_address: &str, user_agent: &str) -> UserSession {
        UserSession {
            user_id: self.principal.clone(),
            session_id,
            created_at: 1,
            last_activity: 1,
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            is_active: true,
        }
    }
}

#[async_trait]
impl BackendClient for MockClient {
    fn principal(&self) -> Principal {
        self.principal.clone()
    }

    async fn create_session(&self, ip_address: &str, user_agent: &str) -> Result<UserSession> {
        self.state.record(Call::CreateSession {
            principal: self.principal.to_text(),
            user_agent: user_agent.to_string(),
        });
        if self.state.behavior.lock().fail_create_session {
            return Err(Error::BackendConnectionFailed("mock create_session failure".into()));
        }

        let n = self.state.next_session.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.session(format!("session-{}", n), ip_address, user_agent))
    }

    async fn update_session_activity(&self, session_id: &str) -> Result<UserSession> {
        self.state.record(Call::UpdateActivity {
            session_id: session_id.to_string(),
        });
        Ok(self.session(session_id.to_string(), "", ""))
    }

    async fn end_session(&self, session_id: &str) -> Result<()> {
        self.state.record(Call::EndSession {
            session_id: session_id.to_string(),
        });
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<UserProfile>> {
        self.state.record(Call::GetUser {
            principal: self.principal.to_text(),
        });
        if self.state.behavior.lock().fail_get_user {
            return Err(Error::BackendConnectionFailed("mock get_user failure".into()));
        }
        if self.principal.is_anonymous() {
            return Ok(None);
        }

        Ok(Some(UserProfile {
            id: self.principal.clone(),
            wallet_address: self.principal.to_text(),
            created_at: 1,
            username: Some("tester".into()),
            email: None,
            balance: 0,
        }))
    }
}
