//! Wallet core configuration.
//!
//! Backend location, session timing and client metadata, loaded from
//! environment variables with sensible local-development defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend host (local replica)
pub const DEFAULT_HOST: &str = "http://localhost:4943";

/// Default backend canister id
pub const DEFAULT_CANISTER_ID: &str = "uxrrr-q7777-77774-qaaaq-cai";

/// Default interval between session-activity heartbeats (5 minutes)
pub const DEFAULT_HEARTBEAT_SECS: u64 = 300;

/// Default bound on a single backend call
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Which network the backend lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// Local replica; requires the root-key trust bootstrap
    Local,
    /// Public mainnet
    Ic,
}

impl NetworkKind {
    /// Parse the `ARTA_DFX_NETWORK` value; unknown values fall back to `Local`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ic" | "mainnet" => NetworkKind::Ic,
            _ => NetworkKind::Local,
        }
    }

    /// Whether connections must fetch the replica root key before use
    pub fn needs_root_key(self) -> bool {
        matches!(self, NetworkKind::Local)
    }
}

/// Where the backend collaborator lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Replica / boundary node URL
    pub host: String,
    /// Payment backend canister id
    pub canister_id: String,
    /// Network kind
    pub network: NetworkKind,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            canister_id: DEFAULT_CANISTER_ID.to_string(),
            network: NetworkKind::Local,
        }
    }
}

/// Client metadata reported when a backend session is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Reported client address
    pub ip_address: String,
    /// Reported user agent
    pub user_agent: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            ip_address: "127.0.0.1".to_string(),
            user_agent: format!("arta-wallet-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration for the wallet core
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Backend location
    pub backend: BackendConfig,
    /// Interval between heartbeats while a session is active
    pub heartbeat_interval: Duration,
    /// Bound applied to every backend call
    pub backend_timeout: Duration,
    /// Client metadata for session creation
    pub client: ClientInfo,
    /// Directory for file-backed storage (None for in-memory)
    pub data_dir: Option<PathBuf>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            client: ClientInfo::default(),
            data_dir: None,
        }
    }
}

impl WalletConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `ARTA_IC_HOST` | `http://localhost:4943` |
    /// | `ARTA_CANISTER_ID` | `uxrrr-q7777-77774-qaaaq-cai` |
    /// | `ARTA_DFX_NETWORK` | `local` |
    /// | `ARTA_HEARTBEAT_SECS` | `300` |
    /// | `ARTA_BACKEND_TIMEOUT_SECS` | `30` |
    /// | `ARTA_DATA_DIR` | unset (in-memory) |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            backend: BackendConfig {
                host: env::var("ARTA_IC_HOST").unwrap_or(defaults.backend.host),
                canister_id: env::var("ARTA_CANISTER_ID").unwrap_or(defaults.backend.canister_id),
                network: env::var("ARTA_DFX_NETWORK")
                    .map(|v| NetworkKind::parse(&v))
                    .unwrap_or(defaults.backend.network),
            },
            heartbeat_interval: secs_from_env("ARTA_HEARTBEAT_SECS")
                .unwrap_or(defaults.heartbeat_interval),
            backend_timeout: secs_from_env("ARTA_BACKEND_TIMEOUT_SECS")
                .unwrap_or(defaults.backend_timeout),
            client: defaults.client,
            data_dir: env::var("ARTA_DATA_DIR").ok().map(PathBuf::from),
        }
    }
}

fn secs_from_env(name: &str) -> Option<Duration> {
    let raw = env::var(name).ok()?;
    match parse_secs(&raw) {
        Some(d) => Some(d),
        None => {
            tracing::warn!(variable = name, value = %raw, "Ignoring invalid duration");
            None
        }
    }
}

fn parse_secs(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
