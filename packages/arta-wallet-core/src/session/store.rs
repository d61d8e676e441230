//! The persisted session slot.
//!
//! At most one [`ActiveSession`] is stored, under `icp_current_session`,
//! together with the raw `icp_auth_state = "authenticated"` marker. The
//! record carries an integrity tag over every other field; restore refuses
//! a record whose tag, key or principal do not line up.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::crypto::domain;
use crate::error::{Error, Result};
use crate::identity::DerivedIdentity;
use crate::storage::{self, keys, WalletStorage};

/// Persisted state of an active session
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// Ed25519 secret key bytes
    pub private_key: Vec<u8>,
    /// Ed25519 public key bytes
    pub public_key: Vec<u8>,
    /// Principal text
    pub principal: String,
    /// Name of the vault record the session was opened from
    pub wallet_name: String,
    /// Unix milliseconds
    pub connected_at: i64,
    /// Backend session id, if the backend accepted one
    #[serde(default)]
    pub session_id: Option<String>,
    /// Hex SHA-256 over the other fields
    pub integrity_tag: String,
}

impl ActiveSession {
    /// Build and seal a session record for an identity
    pub fn new(
        identity: &DerivedIdentity,
        wallet_name: &str,
        connected_at: i64,
        session_id: Option<String>,
    ) -> Self {
        let mut session = Self {
            private_key: identity.secret_bytes().to_vec(),
            public_key: identity.public_key_bytes().to_vec(),
            principal: identity.principal().to_text(),
            wallet_name: wallet_name.to_string(),
            connected_at,
            session_id,
            integrity_tag: String::new(),
        };
        session.integrity_tag = session.compute_tag();
        session
    }

    /// Tag over every field except the tag itself
    pub fn compute_tag(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(domain::SESSION_TAG);
        for field in [
            self.private_key.as_slice(),
            self.public_key.as_slice(),
            self.principal.as_bytes(),
            self.wallet_name.as_bytes(),
        ] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field);
        }
        hasher.update(self.connected_at.to_be_bytes());
        match &self.session_id {
            Some(id) => {
                hasher.update([1u8]);
                hasher.update((id.len() as u64).to_be_bytes());
                hasher.update(id.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hex::encode(hasher.finalize())
    }

    /// Rebuild the identity, verifying the record against itself
    ///
    /// ## Errors
    ///
    /// `IntegrityCheckFailed` if the tag does not match, or the stored key
    /// does not produce the stored public key and principal.
    pub fn restore_identity(&self) -> Result<DerivedIdentity> {
        if self.compute_tag() != self.integrity_tag {
            return Err(Error::IntegrityCheckFailed("session integrity tag mismatch".into()));
        }

        let identity = DerivedIdentity::from_secret_bytes(&self.private_key)
            .map_err(|e| Error::IntegrityCheckFailed(format!("session key unusable: {}", e)))?;

        if identity.public_key_bytes().as_slice() != self.public_key.as_slice() {
            return Err(Error::IntegrityCheckFailed("session public key mismatch".into()));
        }
        if identity.principal().to_text() != self.principal {
            return Err(Error::IntegrityCheckFailed("session principal mismatch".into()));
        }

        Ok(identity)
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("principal", &self.principal)
            .field("wallet_name", &self.wallet_name)
            .field("connected_at", &self.connected_at)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Owner of the single session slot
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn WalletStorage>,
}

impl SessionStore {
    /// Create a store over the given storage
    pub fn new(storage: Arc<dyn WalletStorage>) -> Self {
        Self { storage }
    }

    /// The persisted session, if any
    pub fn load(&self) -> Result<Option<ActiveSession>> {
        storage::get_json(self.storage.as_ref(), keys::CURRENT_SESSION)
    }

    /// Persist a session and the auth marker
    pub fn save(&self, session: &ActiveSession) -> Result<()> {
        storage::set_json(self.storage.as_ref(), keys::CURRENT_SESSION, session)?;
        self.storage.set(keys::AUTH_STATE, keys::AUTHENTICATED)
    }

    /// Remove the session and the auth marker
    pub fn clear(&self) -> Result<()> {
        self.storage.delete(keys::CURRENT_SESSION)?;
        self.storage.delete(keys::AUTH_STATE)?;
        Ok(())
    }

    /// Whether the auth marker is set
    pub fn is_marked_authenticated(&self) -> Result<bool> {
        Ok(self.storage.get(keys::AUTH_STATE)?.as_deref() == Some(keys::AUTHENTICATED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn identity() -> DerivedIdentity {
        DerivedIdentity::from_seed(&[11u8; 32])
    }

    #[test]
    fn test_restore_round_trip() {
        let session = ActiveSession::new(&identity(), "main", 1_700_000_000_000, Some("s-1".into()));
        let restored = session.restore_identity().unwrap();
        assert_eq!(restored.principal(), identity().principal());
    }

    #[test]
    fn test_tag_covers_fields() {
        let session = ActiveSession::new(&identity(), "main", 5, None);

        let mut renamed = session.clone();
        renamed.wallet_name = "other".into();
        assert!(matches!(
            renamed.restore_identity(),
            Err(Error::IntegrityCheckFailed(_))
        ));

        let mut with_id = session.clone();
        with_id.session_id = Some("s-9".into());
        assert!(with_id.restore_identity().is_err());
    }

    #[test]
    fn test_swapped_key_rejected_even_with_fresh_tag() {
        let mut session = ActiveSession::new(&identity(), "main", 5, None);
        session.private_key = vec![12u8; 32];
        session.integrity_tag = session.compute_tag();

        assert!(matches!(
            session.restore_identity(),
            Err(Error::IntegrityCheckFailed(_))
        ));
    }

    #[test]
    fn test_store_slot_and_marker() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        assert!(store.load().unwrap().is_none());
        assert!(!store.is_marked_authenticated().unwrap());

        store
            .save(&ActiveSession::new(&identity(), "main", 5, None))
            .unwrap();
        assert_eq!(
            storage.get(keys::AUTH_STATE).unwrap().as_deref(),
            Some("authenticated")
        );
        assert_eq!(store.load().unwrap().unwrap().wallet_name, "main");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.is_marked_authenticated().unwrap());
    }

    #[test]
    fn test_json_shape() {
        let session = ActiveSession::new(&identity(), "main", 5, Some("s-1".into()));
        let value = serde_json::to_value(&session).unwrap();
        assert!(value["privateKey"].is_array());
        assert_eq!(value["walletName"], "main");
        assert_eq!(value["sessionId"], "s-1");
        assert!(value["integrityTag"].is_string());
    }
}
