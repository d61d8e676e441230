//! Connector for running without a backend.
//!
//! Connections carry the bound principal so local state stays correct, but
//! every remote call fails with `BackendConnectionFailed("offline")`. The
//! session controller treats those calls as best-effort, so wallets can be
//! created and unlocked offline.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendClient, BackendConnector, UserProfile, UserSession};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::identity::{DerivedIdentity, Principal};

fn offline() -> Error {
    Error::BackendConnectionFailed("offline".into())
}

/// Connector whose clients never reach a backend
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineConnector;

impl OfflineConnector {
    /// Create an offline connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BackendConnector for OfflineConnector {
    async fn connect(
        &self,
        backend: &BackendConfig,
        identity: Option<&DerivedIdentity>,
    ) -> Result<Arc<dyn BackendClient>> {
        let principal = identity
            .map(|i| i.principal().clone())
            .unwrap_or_else(Principal::anonymous);
        tracing::debug!(
            principal = %principal,
            host = %backend.host,
            canister_id = %backend.canister_id,
            "Offline connection"
        );
        Ok(Arc::new(OfflineClient { principal }))
    }

    async fn fetch_root_key(&self, _client: &dyn BackendClient) -> Result<()> {
        Err(offline())
    }
}

/// Client returned by [`OfflineConnector`]
#[derive(Debug, Clone)]
pub struct OfflineClient {
    principal: Principal,
}

#[async_trait]
impl BackendClient for OfflineClient {
    fn principal(&self) -> Principal {
        self.principal.clone()
    }

    async fn create_session(&self, _ip_address: &str, _user_agent: &str) -> Result<UserSession> {
        Err(offline())
    }

    async fn update_session_activity(&self, _session_id: &str) -> Result<UserSession> {
        Err(offline())
    }

    async fn end_session(&self, _session_id: &str) -> Result<()> {
        Err(offline())
    }

    async fn get_user(&self) -> Result<Option<UserProfile>> {
        Err(offline())
    }
}
