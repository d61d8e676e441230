//! # Key Management
//!
//! Ed25519 key pairs backing wallet identities.
//!
//! A wallet identity is one Ed25519 key whose 32-byte secret is the seed
//! derived from the recovery phrase. The secret is also what gets cached
//! and persisted in the session slot, so the same type can be rebuilt from
//! either source.

use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::{Zeroizing, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of an Ed25519 secret key seed
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of an Ed25519 public key
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private signing key (secret)
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Create from a 32-byte seed
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Self {
        let secret = SigningKey::from_bytes(bytes);
        Self { secret }
    }

    /// Create from stored secret key material
    ///
    /// Accepts the 32-byte seed, or the 64-byte `seed || public key` layout
    /// some key stores use; in the latter case the embedded public key must
    /// match the one computed from the seed.
    pub fn from_secret_slice(bytes: &[u8]) -> Result<Self> {
        let seed: [u8; SECRET_KEY_SIZE] = match bytes.len() {
            SECRET_KEY_SIZE | 64 => bytes[..SECRET_KEY_SIZE]
                .try_into()
                .map_err(|_| Error::InvalidKey("Invalid secret key length".into()))?,
            other => {
                return Err(Error::InvalidKey(format!(
                    "Secret key must be 32 or 64 bytes, got {}",
                    other
                )))
            }
        };
        let seed = Zeroizing::new(seed);
        let keypair = Self::from_bytes(&seed);

        if bytes.len() == 64 && bytes[SECRET_KEY_SIZE..] != keypair.public_bytes() {
            return Err(Error::InvalidKey(
                "Embedded public key does not match secret key".into(),
            ));
        }

        Ok(keypair)
    }

    /// Get the secret key bytes (for cache and session storage)
    ///
    /// ## Security Warning
    ///
    /// Never log or transmit these bytes.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}
