//! # Session Controller
//!
//! Drives the wallet's authentication state and binds the active identity
//! to the backend.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SESSION STATE MACHINE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   start() ──► restore persisted slot ──ok──► Active                     │
//! │       │            │ missing / invalid (slot cleared)                   │
//! │       │            │ backend unreachable (slot kept)                    │
//! │       │            ▼                                                    │
//! │       └──────► anonymous connection ──► NoSession                      │
//! │                                                                         │
//! │   NoSession ──create/import/login──► Authenticating ──ok──► Active     │
//! │                                          │                              │
//! │                                          └──error──► NoSession          │
//! │                                                      (anonymous again)  │
//! │                                                                         │
//! │   Active ──logout──► NoSession                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Activation
//!
//! 1. connect as the identity
//! 2. local networks only: fetch the root key (best-effort)
//! 3. `create_session(ip, user agent)` (best-effort; no session id on failure)
//! 4. `get_user()` (best-effort)
//! 5. persist the sealed [`ActiveSession`] and the auth marker (a failure
//!    here closes the backend session opened in step 3)
//! 6. start the heartbeat if a session id was issued
//!
//! Every backend call is bounded by the configured timeout. Only one of
//! `start`, `create_wallet`, `import_wallet`, `login` and `logout` runs at
//! a time; a concurrent call fails with `SessionBusy`.

mod heartbeat;
mod store;

pub use store::{ActiveSession, SessionStore};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use self::heartbeat::Heartbeat;
use crate::backend::{BackendClient, BackendConnector, UserProfile};
use crate::config::WalletConfig;
use crate::error::{Error, Result};
use crate::identity::{DerivedIdentity, IdentityDeriver, Principal, RecoveryPhrase};
use crate::storage::WalletStorage;
use crate::vault::Vault;

/// Public view of an active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Principal of the unlocked wallet
    pub principal: Principal,
    /// Vault record name
    pub wallet_name: String,
    /// Unix milliseconds
    pub connected_at: i64,
    /// Backend session id, if one was issued
    pub session_id: Option<String>,
}

/// Authentication state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No wallet unlocked
    NoSession,
    /// A create/import/login flow is running
    Authenticating,
    /// A wallet is unlocked and bound to the backend
    Active(SessionInfo),
}

impl SessionState {
    /// Whether a wallet is unlocked
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}

#[derive(Default)]
struct Inner {
    state: Option<SessionState>,
    client: Option<Arc<dyn BackendClient>>,
    user: Option<UserProfile>,
    heartbeat: Option<Heartbeat>,
}

/// Clears the busy flag when dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SessionBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Wallet session controller
pub struct SessionController<C: BackendConnector> {
    config: WalletConfig,
    connector: C,
    deriver: IdentityDeriver,
    vault: Vault,
    store: SessionStore,
    busy: AtomicBool,
    inner: Mutex<Inner>,
}

impl<C: BackendConnector> SessionController<C> {
    /// Create a controller; call [`start`](Self::start) before use
    pub fn new(config: WalletConfig, connector: C, storage: Arc<dyn WalletStorage>) -> Self {
        let deriver = IdentityDeriver::new(storage.clone());
        let vault = Vault::new(storage.clone(), deriver.clone());
        let store = SessionStore::new(storage);

        Self {
            config,
            connector,
            deriver,
            vault,
            store,
            busy: AtomicBool::new(false),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The wallet vault
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// The identity deriver
    pub fn deriver(&self) -> &IdentityDeriver {
        &self.deriver
    }

    /// Configuration in use
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    // ========================================================================
    // STATE
    // ========================================================================

    /// Current state
    pub fn state(&self) -> SessionState {
        self.inner
            .lock()
            .state
            .clone()
            .unwrap_or(SessionState::NoSession)
    }

    /// Whether a wallet is unlocked
    pub fn is_authenticated(&self) -> bool {
        self.state().is_active()
    }

    /// The active session
    ///
    /// ## Errors
    ///
    /// `NoSession` unless a wallet is unlocked.
    pub fn session_info(&self) -> Result<SessionInfo> {
        match self.state() {
            SessionState::Active(info) => Ok(info),
            _ => Err(Error::NoSession),
        }
    }

    /// Principal of the unlocked wallet
    pub fn principal(&self) -> Option<Principal> {
        self.session_info().ok().map(|info| info.principal)
    }

    /// Current backend connection (anonymous while no wallet is unlocked)
    pub fn client(&self) -> Option<Arc<dyn BackendClient>> {
        self.inner.lock().client.clone()
    }

    /// Profile loaded after activation
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.lock().user.clone()
    }

    // ========================================================================
    // FLOWS
    // ========================================================================

    /// Initial transition: restore the persisted session or connect anonymously
    pub async fn start(&self) -> Result<SessionState> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        match self.load_persisted() {
            Ok(Some((session, identity))) => {
                match self
                    .activate(identity, &session.wallet_name, Some(&session))
                    .await
                {
                    Ok(info) => {
                        tracing::info!(principal = %info.principal, wallet = %info.wallet_name, "Session restored");
                        return Ok(SessionState::Active(info));
                    }
                    // The slot is still valid; the next start retries it
                    Err(e) => tracing::warn!(error = %e, "Could not resume persisted session"),
                }
            }
            Ok(None) => tracing::debug!("No persisted session"),
            Err(e) if invalidates_session(&e) => {
                tracing::warn!(error = %e, "Discarding persisted session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "Failed to clear persisted session");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not read persisted session"),
        }

        self.set_state(SessionState::NoSession);
        self.connect_anonymous().await?;
        Ok(self.state())
    }

    /// Create a wallet from a freshly generated phrase and activate it
    pub async fn create_wallet(
        &self,
        name: &str,
        phrase: &RecoveryPhrase,
        password: &str,
    ) -> Result<SessionInfo> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.begin_authenticating().await;

        let result = async {
            let (record, identity) = self.create_in_vault(name, phrase, password).await?;
            self.activate(identity, &record.name, None).await
        }
        .await;

        self.finish(result).await
    }

    /// Import a wallet from user-entered phrase text and activate it
    ///
    /// The text is validated before any derivation or state change.
    pub async fn import_wallet(
        &self,
        name: &str,
        phrase_text: &str,
        password: &str,
    ) -> Result<SessionInfo> {
        let phrase = RecoveryPhrase::parse(phrase_text)?;
        self.create_wallet(name, &phrase, password).await
    }

    /// Check a re-typed backup against the generated phrase
    pub fn verify_backup(&self, phrase: &RecoveryPhrase, typed: &str) -> Result<()> {
        phrase.verify_backup(typed)
    }

    /// Unlock a saved wallet and activate it
    pub async fn login(&self, name: &str, password: &str) -> Result<SessionInfo> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.begin_authenticating().await;

        let result = async {
            let record = self
                .vault
                .find(name)?
                .ok_or_else(|| Error::WalletNotFound(name.trim().to_string()))?;

            let vault = self.vault.clone();
            let unlock_record = record.clone();
            let password = Zeroizing::new(password.to_string());
            let identity = tokio::task::spawn_blocking(move || vault.unlock(&unlock_record, &password))
                .await
                .map_err(|e| Error::Internal(format!("unlock task failed: {}", e)))??;

            self.activate(identity, &record.name, None).await
        }
        .await;

        self.finish(result).await
    }

    /// End the session and return to anonymous
    pub async fn logout(&self) -> Result<SessionState> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        self.teardown().await;
        if let Err(e) = self.connect_anonymous().await {
            tracing::warn!(error = %e, "Anonymous reconnect after logout failed");
        }

        tracing::info!("Logged out");
        Ok(SessionState::NoSession)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    async fn create_in_vault(
        &self,
        name: &str,
        phrase: &RecoveryPhrase,
        password: &str,
    ) -> Result<(crate::vault::EncryptedWalletRecord, DerivedIdentity)> {
        let vault = self.vault.clone();
        let name = name.to_string();
        let phrase = phrase.clone();
        let password = Zeroizing::new(password.to_string());

        tokio::task::spawn_blocking(move || vault.create(&name, &phrase, &password))
            .await
            .map_err(|e| Error::Internal(format!("wallet creation task failed: {}", e)))?
    }

    /// Load and verify the persisted session without touching the backend
    fn load_persisted(&self) -> Result<Option<(ActiveSession, DerivedIdentity)>> {
        let marked = self.store.is_marked_authenticated()?;
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };
        if !marked {
            return Err(Error::IntegrityCheckFailed(
                "persisted session has no auth marker".into(),
            ));
        }

        let identity = session.restore_identity()?;
        if !self.vault.contains_principal(&session.principal)? {
            return Err(Error::IntegrityCheckFailed(
                "persisted session has no matching wallet".into(),
            ));
        }

        Ok(Some((session, identity)))
    }

    /// Bind an identity to the backend and record the session
    async fn activate(
        &self,
        identity: DerivedIdentity,
        wallet_name: &str,
        resumed: Option<&ActiveSession>,
    ) -> Result<SessionInfo> {
        let client = self
            .bounded("connect", self.connector.connect(&self.config.backend, Some(&identity)))
            .await?;

        if self.config.backend.network.needs_root_key() {
            self.best_effort("fetch_root_key", self.connector.fetch_root_key(client.as_ref()))
                .await;
        }

        let (session_id, created) = match resumed.and_then(|s| s.session_id.clone()) {
            Some(id) => (Some(id), false),
            None => {
                let id = self
                    .best_effort(
                        "create_session",
                        client.create_session(
                            &self.config.client.ip_address,
                            &self.config.client.user_agent,
                        ),
                    )
                    .await
                    .map(|s| s.session_id);
                (id, true)
            }
        };

        let user = self
            .best_effort("get_user", client.get_user())
            .await
            .flatten();

        let connected_at = resumed
            .map(|s| s.connected_at)
            .unwrap_or_else(crate::time::now_timestamp_millis);
        let saved = self.store.save(&ActiveSession::new(
            &identity,
            wallet_name,
            connected_at,
            session_id.clone(),
        ));
        if let Err(e) = saved {
            // Close a backend session opened by this activation
            if let (true, Some(id)) = (created, &session_id) {
                self.best_effort("end_session", client.end_session(id)).await;
            }
            return Err(e);
        }

        let heartbeat = session_id.clone().map(|id| {
            Heartbeat::start(
                client.clone(),
                id,
                self.config.heartbeat_interval,
                self.config.backend_timeout,
            )
        });

        let info = SessionInfo {
            principal: identity.principal().clone(),
            wallet_name: wallet_name.to_string(),
            connected_at,
            session_id,
        };

        {
            let mut inner = self.inner.lock();
            inner.state = Some(SessionState::Active(info.clone()));
            inner.client = Some(client);
            inner.user = user;
            // Replacing drops (and aborts) any previous heartbeat
            inner.heartbeat = heartbeat;
        }

        tracing::info!(principal = %info.principal, wallet = %info.wallet_name, "Session active");
        Ok(info)
    }

    /// Tear down whatever is active and enter `Authenticating`
    async fn begin_authenticating(&self) {
        self.teardown().await;
        self.set_state(SessionState::Authenticating);
    }

    /// On failure, return to `NoSession` with an anonymous connection
    async fn finish(&self, result: Result<SessionInfo>) -> Result<SessionInfo> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Authentication failed");
            self.teardown().await;
            if let Err(e) = self.connect_anonymous().await {
                tracing::warn!(error = %e, "Anonymous reconnect failed");
            }
        }
        result
    }

    /// End the backend session, stop the heartbeat, clear memory and the slot
    async fn teardown(&self) {
        let (client, session_id, heartbeat) = {
            let mut inner = self.inner.lock();
            let session_id = match inner.state.take() {
                Some(SessionState::Active(info)) => info.session_id,
                _ => None,
            };
            inner.user = None;
            (inner.client.take(), session_id, inner.heartbeat.take())
        };

        if let Some(heartbeat) = heartbeat {
            heartbeat.stop();
        }
        if let (Some(client), Some(id)) = (client, session_id) {
            self.best_effort("end_session", client.end_session(&id)).await;
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
    }

    async fn connect_anonymous(&self) -> Result<()> {
        let client = self.bounded("connect", self.connector.connect(&self.config.backend, None)).await?;

        if self.config.backend.network.needs_root_key() {
            self.best_effort("fetch_root_key", self.connector.fetch_root_key(client.as_ref()))
                .await;
        }

        self.inner.lock().client = Some(client);
        tracing::debug!("Connected anonymously");
        Ok(())
    }

    fn set_state(&self, state: SessionState) {
        self.inner.lock().state = Some(state);
    }

    /// Run a backend call under the configured timeout
    async fn bounded<T>(&self, op: &'static str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.backend_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{} did not complete within {:?}",
                op, self.config.backend_timeout
            ))),
        }
    }

    /// Run a backend call whose failure is logged and ignored
    async fn best_effort<T>(&self, op: &'static str, call: impl Future<Output = Result<T>>) -> Option<T> {
        match self.bounded(op, call).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(op, error = %e, "Backend call failed");
                None
            }
        }
    }
}

/// Whether a restore error means the persisted session itself is bad
///
/// Backend and I/O failures leave the slot in place for the next start.
fn invalidates_session(error: &Error) -> bool {
    matches!(
        error,
        Error::IntegrityCheckFailed(_)
            | Error::StorageCorrupted(_)
            | Error::DeserializationError(_)
            | Error::IdentityDerivationFailed(_)
            | Error::InvalidPrincipal(_)
    )
}

// ============================================================================
// TESTS
// ============================================================================
