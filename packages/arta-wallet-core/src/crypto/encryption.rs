//! # Encryption Module
//!
//! AES-256-GCM for recovery phrases at rest.
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Phrase unreadable without the vault password |
//! | Integrity | Wrong password or any modification fails the tag check |
//! | Binding | AAD ties the ciphertext to its purpose |

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// **Never reuse a nonce with the same key.** Every vault entry gets a fresh
/// random salt, hence a fresh key, and a fresh random nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::EncryptionFailed(format!("No secure randomness: {}", e)))?;
        Ok(Self(bytes))
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Encrypt with AES-256-GCM under a fresh random nonce
///
/// Returns `(nonce, ciphertext_with_tag)`.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random()?;
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce.0), payload)
        .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))?;

    Ok((nonce, ciphertext))
}

/// Decrypt with AES-256-GCM
///
/// ## Errors
///
/// Returns `IntegrityCheckFailed` if the tag does not verify: the key is
/// wrong (wrong password), or the ciphertext, nonce or AAD were altered.
pub fn decrypt(
    key: &EncryptionKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {}", e)))?;

    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), payload)
        .map_err(|_| Error::IntegrityCheckFailed("authentication tag mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = EncryptionKey::from_bytes([7u8; KEY_SIZE]);
        let (nonce, ciphertext) = encrypt(&key, b"recovery words", b"aad").unwrap();

        assert_eq!(ciphertext.len(), b"recovery words".len() + TAG_SIZE);
        let plaintext = decrypt(&key, &nonce, &ciphertext, b"aad").unwrap();
        assert_eq!(plaintext, b"recovery words");
    }

    #[test]
    fn test_wrong_key_fails_integrity() {
        let key = EncryptionKey::from_bytes([7u8; KEY_SIZE]);
        let other = EncryptionKey::from_bytes([8u8; KEY_SIZE]);
        let (nonce, ciphertext) = encrypt(&key, b"secret", b"").unwrap();

        let result = decrypt(&other, &nonce, &ciphertext, b"");
        assert!(matches!(result, Err(Error::IntegrityCheckFailed(_))));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let key = EncryptionKey::from_bytes([7u8; KEY_SIZE]);
        let (nonce, ciphertext) = encrypt(&key, b"secret", b"wallet-a").unwrap();

        assert!(decrypt(&key, &nonce, &ciphertext, b"wallet-b").is_err());
    }

    #[test]
    fn test_nonces_are_unique() {
        let a = Nonce::random().unwrap();
        let b = Nonce::random().unwrap();
        assert_ne!(a, b);
    }
}
