//! In-memory storage.
//!
//! Nothing survives the process. Used by tests and by hosts that only
//! need an ephemeral wallet.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::WalletStorage;
use crate::error::Result;

/// `HashMap`-backed [`WalletStorage`]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl WalletStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("a", "1").unwrap();
        storage.set("a", "2").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);

        assert!(storage.delete("a").unwrap());
        assert!(!storage.delete("a").unwrap());
        assert!(storage.get("a").unwrap().is_none());
    }

    #[test]
    fn test_keys() {
        let storage = MemoryStorage::new();
        storage.set("icp_identity_aa", "{}").unwrap();
        storage.set("arta_wallets", "[]").unwrap();

        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["arta_wallets", "icp_identity_aa"]);
    }
}
