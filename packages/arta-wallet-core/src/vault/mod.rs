//! # Local Vault
//!
//! Password-protected storage of recovery phrases.
//!
//! ## Record Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         VAULT OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  create(name, phrase, password)                                        │
//! │    validate → derive identity → encrypt phrase → save                  │
//! │                                                                         │
//! │  save(name, blob, identity, phrase)                                    │
//! │    drop records with the same name OR the same principal, append       │
//! │                                                                         │
//! │  unlock(record, password)                                              │
//! │    decrypt ──► derive ──► principal == record.publicIdentifier ?       │
//! │                              │ no                   │ yes              │
//! │                              ▼                      ▼                  │
//! │                     IntegrityCheckFailed    migrate legacy blob,       │
//! │                                             stamp lastUnlockedAt      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The vault owns the `arta_wallets` collection. Records are listed without
//! ever decrypting them.

mod cipher;
mod record;

pub use cipher::{is_legacy, V2_PREFIX};
pub use record::EncryptedWalletRecord;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::identity::{DerivedIdentity, IdentityDeriver, RecoveryPhrase};
use crate::storage::{self, keys, WalletStorage};

/// Maximum wallet name length in characters
pub const MAX_NAME_LEN: usize = 64;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Encrypted wallet collection
#[derive(Clone)]
pub struct Vault {
    storage: Arc<dyn WalletStorage>,
    deriver: IdentityDeriver,
}

impl Vault {
    /// Create a vault over the given storage
    pub fn new(storage: Arc<dyn WalletStorage>, deriver: IdentityDeriver) -> Self {
        Self { storage, deriver }
    }

    /// Encrypt a phrase under a password
    pub fn encrypt(phrase: &RecoveryPhrase, password: &str) -> Result<String> {
        cipher::encrypt(phrase, password)
    }

    /// Decrypt a vault blob (either format)
    pub fn decrypt(blob: &str, password: &str) -> Result<RecoveryPhrase> {
        cipher::decrypt(blob, password)
    }

    /// All saved records
    pub fn list(&self) -> Result<Vec<EncryptedWalletRecord>> {
        Ok(storage::get_json(self.storage.as_ref(), keys::WALLETS)?.unwrap_or_default())
    }

    /// Find a record by name
    pub fn find(&self, name: &str) -> Result<Option<EncryptedWalletRecord>> {
        let name = name.trim();
        Ok(self.list()?.into_iter().find(|r| r.name == name))
    }

    /// Whether some record carries this principal
    pub fn contains_principal(&self, principal: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|r| r.public_identifier == principal))
    }

    /// Persist a record, replacing any with the same name or principal
    pub fn save(
        &self,
        name: &str,
        encrypted_mnemonic: String,
        identity: &DerivedIdentity,
        phrase: &RecoveryPhrase,
    ) -> Result<EncryptedWalletRecord> {
        let name = name.trim();
        let principal = identity.principal().to_text();

        let record = EncryptedWalletRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            encrypted_mnemonic,
            public_identifier: principal.clone(),
            created_at: crate::time::now_timestamp_millis(),
            mnemonic_hash_ref: IdentityDeriver::phrase_hash(phrase),
            last_unlocked_at: None,
        };

        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.name != name && r.public_identifier != principal);
        if records.len() != before {
            tracing::info!(
                wallet = name,
                replaced = before - records.len(),
                "Replacing existing wallet record"
            );
        }
        records.push(record.clone());
        self.write(&records)?;

        tracing::info!(wallet = name, principal = %principal, "Saved wallet");
        Ok(record)
    }

    /// Validate, derive, encrypt and save a new wallet
    pub fn create(
        &self,
        name: &str,
        phrase: &RecoveryPhrase,
        password: &str,
    ) -> Result<(EncryptedWalletRecord, DerivedIdentity)> {
        validate_name(name)?;
        validate_password(password)?;

        let identity = self.deriver.derive(phrase)?;
        let blob = cipher::encrypt(phrase, password)?;
        let record = self.save(name, blob, &identity, phrase)?;
        Ok((record, identity))
    }

    /// Decrypt a record and check it yields the stored principal
    ///
    /// On success a legacy ciphertext is rewritten in the current format and
    /// the unlock time is recorded. Failing to write that bookkeeping does not
    /// fail the unlock.
    pub fn unlock(&self, record: &EncryptedWalletRecord, password: &str) -> Result<DerivedIdentity> {
        let phrase = cipher::decrypt(&record.encrypted_mnemonic, password)?;
        let identity = self.deriver.derive(&phrase)?;

        if identity.principal().to_text() != record.public_identifier {
            tracing::warn!(wallet = %record.name, "Decrypted phrase does not match stored principal");
            return Err(Error::IntegrityCheckFailed(
                "decrypted identity does not match the stored wallet".into(),
            ));
        }

        if let Err(e) = self.record_unlock(record, &phrase, password) {
            tracing::warn!(wallet = %record.name, error = %e, "Failed to update wallet record after unlock");
        }

        tracing::info!(wallet = %record.name, "Wallet unlocked");
        Ok(identity)
    }

    /// Remove a record by name; returns whether one existed
    pub fn delete(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.name != name);

        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        tracing::info!(wallet = name, "Deleted wallet");
        Ok(true)
    }

    /// Remove every record
    pub fn clear(&self) -> Result<()> {
        self.storage.delete(keys::WALLETS)?;
        tracing::info!("Cleared all wallets");
        Ok(())
    }

    fn record_unlock(
        &self,
        unlocked: &EncryptedWalletRecord,
        phrase: &RecoveryPhrase,
        password: &str,
    ) -> Result<()> {
        let mut records = self.list()?;
        let Some(record) = records.iter_mut().find(|r| r.id == unlocked.id) else {
            return Ok(());
        };

        if cipher::is_legacy(&record.encrypted_mnemonic) {
            record.encrypted_mnemonic = cipher::encrypt(phrase, password)?;
            tracing::info!(wallet = %record.name, "Migrated legacy wallet encryption");
        }
        record.last_unlocked_at = Some(crate::time::now_timestamp_millis());

        self.write(&records)
    }

    fn write(&self, records: &[EncryptedWalletRecord]) -> Result<()> {
        storage::set_json(self.storage.as_ref(), keys::WALLETS, records)
    }
}

/// Wallet names are non-empty after trimming and at most 64 characters
pub fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::ValidationFailed("Wallet name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(Error::ValidationFailed(format!(
            "Wallet name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Passwords are at least 8 characters
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::ValidationFailed(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
