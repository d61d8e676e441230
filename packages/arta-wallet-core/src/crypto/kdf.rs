//! # Key Derivation Functions
//!
//! Every secret the wallet uses is derived from one of two inputs: the
//! recovery phrase, or the user's vault password.
//!
//! ## Derivation Paths
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KEY DERIVATION PATHS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Recovery phrase (canonical text)                                      │
//! │        │                                                                │
//! │        ├──► SHA-256 ──► phrase hash (cache key, salt source)           │
//! │        │                     │                                          │
//! │        │                     ▼ first 16 bytes                           │
//! │        └──► PBKDF2-HMAC-SHA256 (100,000 rounds) ──► 32-byte seed       │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                              Ed25519 signing key       │
//! │                                                                         │
//! │  Vault password + random 16-byte salt                                  │
//! │        │                                                                │
//! │        └──► PBKDF2-HMAC-SHA256 (100,000 rounds)                        │
//! │                     │                                                   │
//! │                     └──► HKDF-SHA256("arta-vault-key-v1") ──► AES key  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The seed path must never change: identities are a pure function of the
//! phrase, and existing wallets would derive a different principal.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// PBKDF2 rounds for phrase → seed derivation
pub const SEED_PBKDF2_ROUNDS: u32 = 100_000;

/// PBKDF2 rounds for password → vault key derivation
pub const VAULT_PBKDF2_ROUNDS: u32 = 100_000;

/// Bytes of the phrase hash used as PBKDF2 salt
pub const SEED_SALT_SIZE: usize = 16;

/// Size of the random salt stored with each vault ciphertext
pub const VAULT_SALT_SIZE: usize = 16;

/// Domain separation strings for HKDF
pub mod domain {
    /// Domain for the vault encryption key
    pub const VAULT_KEY: &[u8] = b"arta-vault-key-v1";

    /// Domain for persisted session integrity tags
    pub const SESSION_TAG: &[u8] = b"arta-session-tag-v1";
}

/// One-way 256-bit digest of a canonical recovery phrase
pub fn phrase_hash(canonical_phrase: &str) -> [u8; 32] {
    let digest = Sha256::digest(canonical_phrase.as_bytes());
    digest.into()
}

/// Derive the 32-byte identity seed for a canonical phrase
///
/// `PBKDF2-HMAC-SHA256(phrase, phrase_hash[..16], 100_000)`.
pub fn derive_identity_seed(canonical_phrase: &str) -> Zeroizing<[u8; 32]> {
    let hash = phrase_hash(canonical_phrase);
    Zeroizing::new(pbkdf2::pbkdf2_hmac_array::<Sha256, 32>(
        canonical_phrase.as_bytes(),
        &hash[..SEED_SALT_SIZE],
        SEED_PBKDF2_ROUNDS,
    ))
}

/// Derive the AES-256 key protecting a vault entry
pub fn derive_vault_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut stretched =
        pbkdf2::pbkdf2_hmac_array::<Sha256, 32>(password.as_bytes(), salt, VAULT_PBKDF2_ROUNDS);

    let hkdf = Hkdf::<Sha256>::new(Some(salt), &stretched);
    let mut key = Zeroizing::new([0u8; 32]);
    let expanded = hkdf.expand(domain::VAULT_KEY, &mut key[..]);
    stretched.zeroize();

    expanded.map_err(|_| Error::EncryptionFailed("Failed to derive vault key".into()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon ability able about above absent absorb abstract absurd abuse access accident";

    #[test]
    fn test_phrase_hash_is_sha256() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(phrase_hash("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_identity_seed_deterministic() {
        let seed1 = derive_identity_seed(PHRASE);
        let seed2 = derive_identity_seed(PHRASE);
        assert_eq!(*seed1, *seed2);
    }

    #[test]
    fn test_identity_seed_differs_per_phrase() {
        let other = PHRASE.replace("accident", "account");
        assert_ne!(*derive_identity_seed(PHRASE), *derive_identity_seed(&other));
    }

    #[test]
    fn test_vault_key_depends_on_salt_and_password() {
        let k1 = derive_vault_key("password123", &[1u8; 16]).unwrap();
        let k2 = derive_vault_key("password123", &[1u8; 16]).unwrap();
        let k3 = derive_vault_key("password123", &[2u8; 16]).unwrap();
        let k4 = derive_vault_key("wrongpass1", &[1u8; 16]).unwrap();

        assert_eq!(*k1, *k2);
        assert_ne!(*k1, *k3);
        assert_ne!(*k1, *k4);
    }
}
