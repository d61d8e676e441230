//! Phrase → identity derivation with a storage-backed cache.
//!
//! PBKDF2 at 100,000 rounds is deliberately slow, so each derived identity
//! is cached under `icp_identity_<phrase hash>`. A cache entry is only
//! trusted if the key rebuilt from it reproduces the cached public key and
//! principal; anything else is treated as corruption and overwritten.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::{DerivedIdentity, RecoveryPhrase};
use crate::crypto;
use crate::error::{Error, Result};
use crate::storage::{self, keys, WalletStorage};

/// Persisted cache entry for a derived identity
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedIdentity {
    /// Ed25519 secret key bytes
    pub private_key: Vec<u8>,
    /// Ed25519 public key bytes
    pub public_key: Vec<u8>,
    /// Principal text
    pub principal: String,
    /// Hex phrase hash this entry was derived from
    pub mnemonic_hash: String,
    /// Unix milliseconds
    pub created: i64,
}

impl Drop for CachedIdentity {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl std::fmt::Debug for CachedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedIdentity")
            .field("principal", &self.principal)
            .field("mnemonic_hash", &self.mnemonic_hash)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

/// Derives wallet identities from recovery phrases
#[derive(Clone)]
pub struct IdentityDeriver {
    storage: Arc<dyn WalletStorage>,
}

impl IdentityDeriver {
    /// Create a deriver caching into the given storage
    pub fn new(storage: Arc<dyn WalletStorage>) -> Self {
        Self { storage }
    }

    /// Hex SHA-256 of the canonical phrase
    pub fn phrase_hash(phrase: &RecoveryPhrase) -> String {
        hex::encode(crypto::phrase_hash(phrase.phrase()))
    }

    /// Derive the identity for a phrase
    ///
    /// Deterministic: the same canonical phrase always yields the same key
    /// pair and principal, whether or not the cache is populated.
    pub fn derive(&self, phrase: &RecoveryPhrase) -> Result<DerivedIdentity> {
        let hash = Self::phrase_hash(phrase);
        let cache_key = keys::identity_cache(&hash);

        match storage::get_json::<CachedIdentity>(self.storage.as_ref(), &cache_key) {
            Ok(Some(entry)) => match restore_cached(&entry) {
                Ok(identity) => {
                    tracing::debug!(hash = %short(&hash), "Identity cache hit");
                    return Ok(identity);
                }
                Err(e) => {
                    tracing::warn!(hash = %short(&hash), error = %e, "Discarding corrupt identity cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(hash = %short(&hash), "Identity cache miss");
            }
            Err(Error::StorageCorrupted(reason)) => {
                tracing::warn!(hash = %short(&hash), %reason, "Unreadable identity cache entry");
            }
            Err(e) => return Err(e),
        }

        let seed = crypto::derive_identity_seed(phrase.phrase());
        let identity = DerivedIdentity::from_seed(&seed);

        let entry = CachedIdentity {
            private_key: identity.secret_bytes().to_vec(),
            public_key: identity.public_key_bytes().to_vec(),
            principal: identity.principal().to_text(),
            mnemonic_hash: hash,
            created: crate::time::now_timestamp_millis(),
        };
        storage::set_json(self.storage.as_ref(), &cache_key, &entry)?;

        tracing::info!(principal = %identity.principal(), "Derived wallet identity");
        Ok(identity)
    }

    /// Read a cache entry by hex phrase hash
    pub fn cached(&self, phrase_hash: &str) -> Result<Option<CachedIdentity>> {
        storage::get_json(self.storage.as_ref(), &keys::identity_cache(phrase_hash))
    }

    /// Remove every identity cache entry; returns how many were removed
    pub fn clear_cache(&self) -> Result<usize> {
        let mut removed = 0;
        for key in self.storage.keys()? {
            if key.starts_with(keys::IDENTITY_CACHE_PREFIX) && self.storage.delete(&key)? {
                removed += 1;
            }
        }

        tracing::debug!(removed, "Cleared identity cache");
        Ok(removed)
    }
}

/// Rebuild an identity from a cache entry, checking it against itself
fn restore_cached(entry: &CachedIdentity) -> Result<DerivedIdentity> {
    let identity = DerivedIdentity::from_secret_bytes(&entry.private_key)?;

    if identity.public_key_bytes().as_slice() != entry.public_key.as_slice() {
        return Err(Error::IdentityDerivationFailed(
            "cached public key does not match private key".into(),
        ));
    }
    if identity.principal().to_text() != entry.principal {
        return Err(Error::IdentityDerivationFailed(
            "cached principal does not match private key".into(),
        ));
    }

    Ok(identity)
}

fn short(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const PHRASE: &str = "abandon ability able about above absent absorb abstract absurd abuse access accident";

    fn deriver() -> (IdentityDeriver, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (IdentityDeriver::new(storage.clone()), storage)
    }

    #[test]
    fn test_derivation_deterministic_across_cache_clears() {
        let (deriver, _) = deriver();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();

        let first = deriver.derive(&phrase).unwrap();
        assert_eq!(deriver.clear_cache().unwrap(), 1);
        let second = deriver.derive(&phrase).unwrap();

        assert_eq!(first.principal(), second.principal());
        assert_eq!(first.public_key_bytes(), second.public_key_bytes());
        assert_eq!(*first.secret_bytes(), *second.secret_bytes());
    }

    #[test]
    fn test_normalized_inputs_share_identity() {
        let (deriver, _) = deriver();
        let a = RecoveryPhrase::parse(PHRASE).unwrap();
        let b = RecoveryPhrase::parse(&format!("  {}  ", PHRASE.to_uppercase())).unwrap();

        assert_eq!(
            deriver.derive(&a).unwrap().principal(),
            deriver.derive(&b).unwrap().principal()
        );
    }

    #[test]
    fn test_cache_entry_written() {
        let (deriver, _) = deriver();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        let identity = deriver.derive(&phrase).unwrap();

        let hash = IdentityDeriver::phrase_hash(&phrase);
        let entry = deriver.cached(&hash).unwrap().unwrap();
        assert_eq!(entry.principal, identity.principal().to_text());
        assert_eq!(entry.mnemonic_hash, hash);
        assert_eq!(entry.private_key.len(), 32);
    }

    #[test]
    fn test_cache_json_shape() {
        let (deriver, storage) = deriver();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        deriver.derive(&phrase).unwrap();

        let key = keys::identity_cache(&IdentityDeriver::phrase_hash(&phrase));
        let raw: serde_json::Value =
            serde_json::from_str(&storage.get(&key).unwrap().unwrap()).unwrap();
        assert!(raw["privateKey"].is_array());
        assert!(raw["publicKey"].is_array());
        assert!(raw["mnemonicHash"].is_string());
        assert!(raw["created"].is_i64());
    }

    #[test]
    fn test_corrupt_cache_is_rederived() {
        let (deriver, storage) = deriver();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        let expected = deriver.derive(&phrase).unwrap();

        let hash = IdentityDeriver::phrase_hash(&phrase);
        let mut entry = deriver.cached(&hash).unwrap().unwrap();
        entry.principal = "2vxsx-fae".into();
        storage::set_json(storage.as_ref(), &keys::identity_cache(&hash), &entry).unwrap();

        let healed = deriver.derive(&phrase).unwrap();
        assert_eq!(healed.principal(), expected.principal());
        assert_eq!(
            deriver.cached(&hash).unwrap().unwrap().principal,
            expected.principal().to_text()
        );
    }

    #[test]
    fn test_unparseable_cache_is_rederived() {
        let (deriver, storage) = deriver();
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        let key = keys::identity_cache(&IdentityDeriver::phrase_hash(&phrase));
        storage.set(&key, "garbage").unwrap();

        assert!(deriver.derive(&phrase).is_ok());
        assert!(deriver.cached(&IdentityDeriver::phrase_hash(&phrase)).unwrap().is_some());
    }

    #[test]
    fn test_clear_cache_leaves_other_keys() {
        let (deriver, storage) = deriver();
        storage.set(keys::WALLETS, "[]").unwrap();
        deriver.derive(&RecoveryPhrase::parse(PHRASE).unwrap()).unwrap();

        assert_eq!(deriver.clear_cache().unwrap(), 1);
        assert!(storage.get(keys::WALLETS).unwrap().is_some());
    }
}
