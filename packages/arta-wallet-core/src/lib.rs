//! # Arta Wallet Core
//!
//! Local key management for Arta Wallet: recovery phrases, deterministic
//! wallet identities, a password-encrypted vault and the authenticated
//! session that binds an identity to the payment backend.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ARTA WALLET CORE MODULES                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐  │
//! │  │  Mnemonic   │──►│  Identity   │◄──│    Vault    │◄──│   Session   │  │
//! │  │             │   │             │   │             │   │             │  │
//! │  │ - BIP39     │   │ - Phrase    │   │ - AES-GCM   │   │ - Restore   │  │
//! │  │ - Fallback  │   │ - Ed25519   │   │ - Legacy    │   │ - Login     │  │
//! │  │   wordlist  │   │ - Principal │   │   migration │   │ - Heartbeat │  │
//! │  └─────────────┘   └──────┬──────┘   └──────┬──────┘   └──────┬──────┘  │
//! │                           │                 │                 │         │
//! │  ┌─────────────┐   ┌──────┴─────────────────┴─────────────────┴──────┐  │
//! │  │   Crypto    │   │                    Storage                      │  │
//! │  │             │   │                                                 │  │
//! │  │ - PBKDF2    │   │ - WalletStorage trait (memory, files)           │  │
//! │  │ - HKDF      │   │ - Identity cache, vault records, session slot   │  │
//! │  │ - AES-GCM   │   └─────────────────────────────────────────────────┘  │
//! │  └─────────────┘                                                        │
//! │                                  Backend (trait seam) ◄── Session       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Key derivation, encryption and signing primitives
//! - [`mnemonic`] - Recovery phrase generation
//! - [`identity`] - Recovery phrases, principals and identity derivation
//! - [`storage`] - Key/value storage used by every component
//! - [`vault`] - Password-encrypted wallet records
//! - [`backend`] - Traits for the remote payment backend
//! - [`session`] - The authentication state machine
//! - [`config`] - Environment-driven configuration
//! - [`logging`] - Tracing setup for host applications
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Deterministic Identity                                        │
//! │  ───────────────────────────────                                        │
//! │  The same 12 words always produce the same Ed25519 key and principal.  │
//! │  Nothing else is needed to recover a wallet.                            │
//! │                                                                         │
//! │  Layer 2: Vault Encryption (PBKDF2 + HKDF + AES-256-GCM)               │
//! │  ─────────────────────────────────────────────────────                  │
//! │  Recovery phrases are stored only encrypted under the wallet           │
//! │  password. A wrong password fails the authentication tag.              │
//! │                                                                         │
//! │  Layer 3: Session Integrity                                             │
//! │  ──────────────────────────                                             │
//! │  The persisted session is sealed with a tag and cross-checked against  │
//! │  its own key and the vault before it is restored.                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod backend;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod logging;
pub mod mnemonic;
pub mod session;
pub mod storage;
/// Wall-clock helpers.
pub mod time;
pub mod vault;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use backend::{BackendClient, BackendConnector, OfflineConnector, UserProfile, UserSession};
pub use config::WalletConfig;
pub use error::{Error, Result};
pub use identity::{DerivedIdentity, IdentityDeriver, Principal, RecoveryPhrase};
pub use mnemonic::MnemonicGenerator;
pub use session::{SessionController, SessionInfo, SessionState};
pub use storage::{FileStorage, MemoryStorage, WalletStorage};
pub use vault::{EncryptedWalletRecord, Vault};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of the wallet core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns build information for debugging
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        target: std::env::consts::OS,
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Build information for debugging
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// Target OS
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.version, version());
        assert_eq!(info.target, std::env::consts::OS);
        assert!(["debug", "release"].contains(&info.profile));
    }
}
