//! # Storage Module
//!
//! The key/value interface every persisted wallet artifact goes through.
//!
//! ## Storage Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE KEYS                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  arta_wallets                 [EncryptedWalletRecord]   (vault)        │
//! │  icp_identity_<phrase hash>   CachedIdentity            (deriver)      │
//! │  icp_current_session          ActiveSession             (session slot) │
//! │  icp_auth_state               "authenticated" (raw)     (auth marker)  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are JSON text, except the auth marker which is stored as-is.
//! Backends are injected as `Arc<dyn WalletStorage>` so the vault, deriver
//! and session store share one view of the data.
//!
//! ## Backends
//!
//! | Backend | Persistence | Use |
//! |---------|-------------|-----|
//! | [`MemoryStorage`] | Process lifetime | Tests, ephemeral sessions |
//! | [`FileStorage`] | One file per key | Desktop / CLI hosts |

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Well-known storage keys
pub mod keys {
    /// Collection of encrypted wallet records
    pub const WALLETS: &str = "arta_wallets";

    /// Prefix of identity cache entries; followed by the hex phrase hash
    pub const IDENTITY_CACHE_PREFIX: &str = "icp_identity_";

    /// The single persisted session slot
    pub const CURRENT_SESSION: &str = "icp_current_session";

    /// Authentication marker
    pub const AUTH_STATE: &str = "icp_auth_state";

    /// Value written under [`AUTH_STATE`] while a session is active
    pub const AUTHENTICATED: &str = "authenticated";

    /// Cache key for a phrase hash
    pub fn identity_cache(phrase_hash_hex: &str) -> String {
        format!("{}{}", IDENTITY_CACHE_PREFIX, phrase_hash_hex)
    }
}

/// String key/value storage
///
/// Implementations must be safe to share between threads; every method is
/// a single, self-contained operation.
pub trait WalletStorage: Send + Sync {
    /// Read a value; `Ok(None)` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; returns whether it existed
    fn delete(&self, key: &str) -> Result<bool>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

/// Read and deserialize a JSON value
///
/// Unparseable data is reported as `StorageCorrupted` rather than a
/// deserialization error, since it came from our own storage.
pub fn get_json<T: DeserializeOwned>(storage: &dyn WalletStorage, key: &str) -> Result<Option<T>> {
    match storage.get(key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::StorageCorrupted(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value
pub fn set_json<T: Serialize + ?Sized>(storage: &dyn WalletStorage, key: &str, value: &T) -> Result<()> {
    let text = serde_json::to_string(value)
        .map_err(|e| Error::SerializationError(format!("{}: {}", key, e)))?;
    storage.set(key, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        set_json(&storage, "numbers", &vec![1u8, 2, 3]).unwrap();

        let numbers: Option<Vec<u8>> = get_json(&storage, "numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u8>> = get_json(&storage, "missing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_corrupt_json_reported() {
        let storage = MemoryStorage::new();
        storage.set(keys::WALLETS, "{not json").unwrap();

        let result: Result<Option<Vec<u8>>> = get_json(&storage, keys::WALLETS);
        assert!(matches!(result, Err(Error::StorageCorrupted(_))));
    }

    #[test]
    fn test_identity_cache_key() {
        assert_eq!(keys::identity_cache("ab12"), "icp_identity_ab12");
    }
}
