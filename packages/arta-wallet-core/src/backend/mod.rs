//! # Backend Seam
//!
//! The remote payment backend is reached only through these traits. A host
//! plugs in a real agent; tests use a recording mock; [`OfflineConnector`]
//! runs the wallet with no backend at all.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BACKEND CALLS                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SessionController                                                      │
//! │        │ connect(Some(identity))  /  connect(None) → anonymous          │
//! │        ▼                                                                │
//! │  BackendConnector ──► BackendClient (bound to one principal)           │
//! │                          ├── create_session(ip, user agent)            │
//! │                          ├── update_session_activity(session id)       │
//! │                          ├── end_session(session id)                   │
//! │                          └── get_user()                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[cfg(test)]
pub(crate) mod mock;
mod offline;

pub use offline::{OfflineClient, OfflineConnector};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::Result;
use crate::identity::{DerivedIdentity, Principal};

/// Backend session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Owner of the session
    pub user_id: Principal,
    /// Backend-assigned session id
    pub session_id: String,
    /// Backend timestamp (nanoseconds)
    pub created_at: u64,
    /// Backend timestamp (nanoseconds) of the last heartbeat
    pub last_activity: u64,
    /// Client address reported at creation
    pub ip_address: String,
    /// Client user agent reported at creation
    pub user_agent: String,
    /// Cleared once the session is ended
    pub is_active: bool,
}

/// Backend user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User principal
    pub id: Principal,
    /// Payment address
    pub wallet_address: String,
    /// Backend timestamp (nanoseconds)
    pub created_at: u64,
    /// Optional display name
    pub username: Option<String>,
    /// Optional contact email
    pub email: Option<String>,
    /// Balance in the backend's smallest unit
    pub balance: u64,
}

/// A connection to the backend bound to one principal
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Principal this connection acts as
    fn principal(&self) -> Principal;

    /// Open a backend session for the bound principal
    async fn create_session(&self, ip_address: &str, user_agent: &str) -> Result<UserSession>;

    /// Heartbeat for an open session
    async fn update_session_activity(&self, session_id: &str) -> Result<UserSession>;

    /// Close a session
    async fn end_session(&self, session_id: &str) -> Result<()>;

    /// Profile of the bound principal, if registered
    async fn get_user(&self) -> Result<Option<UserProfile>>;
}

/// Factory for backend connections
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Connect to the backend described by `backend` as `identity`, or
    /// anonymously for `None`
    async fn connect(
        &self,
        backend: &BackendConfig,
        identity: Option<&DerivedIdentity>,
    ) -> Result<Arc<dyn BackendClient>>;

    /// Trust bootstrap for local networks (fetch the replica root key)
    async fn fetch_root_key(&self, client: &dyn BackendClient) -> Result<()>;
}
