//! Persisted wallet record.

use serde::{Deserialize, Serialize};

/// One saved wallet: the encrypted phrase plus what is needed to list and
/// verify it without decrypting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedWalletRecord {
    /// Random UUID v4
    pub id: String,
    /// User-chosen name, unique within the collection
    pub name: String,
    /// Vault ciphertext of the canonical phrase
    pub encrypted_mnemonic: String,
    /// Principal text of the derived identity
    pub public_identifier: String,
    /// Unix milliseconds
    pub created_at: i64,
    /// Hex phrase hash, links the record to its identity cache entry
    pub mnemonic_hash_ref: String,
    /// Unix milliseconds of the last successful unlock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_unlocked_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let record = EncryptedWalletRecord {
            id: "id-1".into(),
            name: "main".into(),
            encrypted_mnemonic: "v2:abc".into(),
            public_identifier: "2vxsx-fae".into(),
            created_at: 1_700_000_000_000,
            mnemonic_hash_ref: "00ff".into(),
            last_unlocked_at: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["encryptedMnemonic"], "v2:abc");
        assert_eq!(value["publicIdentifier"], "2vxsx-fae");
        assert_eq!(value["mnemonicHashRef"], "00ff");
        assert!(value.get("lastUnlockedAt").is_none());
    }

    #[test]
    fn test_reads_records_without_unlock_time() {
        let json = r#"{"id":"a","name":"n","encryptedMnemonic":"x","publicIdentifier":"p","createdAt":1,"mnemonicHashRef":"h"}"#;
        let record: EncryptedWalletRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.last_unlocked_at, None);
    }
}
