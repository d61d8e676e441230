//! # Identity Module
//!
//! Recovery phrases, the identities derived from them, and principals.
//!
//! ## Identity Derivation Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      IDENTITY DERIVATION FLOW                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Normalize Phrase                                              │
//! │  ─────────────────────────                                              │
//! │  trim, lowercase, collapse whitespace → 12 words joined by ' '        │
//! │                                                                         │
//! │  Step 2: Cache Lookup                                                  │
//! │  ────────────────────                                                   │
//! │  icp_identity_<hex SHA-256(phrase)>                                    │
//! │    hit + self-consistent  → rebuild key from cached secret, done      │
//! │    miss or corrupt        → continue                                   │
//! │                                                                         │
//! │  Step 3: Derive Seed                                                   │
//! │  ───────────────────                                                    │
//! │  PBKDF2-HMAC-SHA256(phrase, SHA-256(phrase)[..16], 100,000) → 32 B    │
//! │                                                                         │
//! │  Step 4: Key Pair & Principal                                          │
//! │  ────────────────────────────                                           │
//! │  Ed25519 SigningKey::from_bytes(seed)                                  │
//! │  principal = SHA-224(DER(public key)) ‖ 0x02                           │
//! │                                                                         │
//! │  Step 5: Cache                                                         │
//! │  ─────────────                                                          │
//! │  store { privateKey, publicKey, principal, mnemonicHash, created }    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod deriver;
mod principal;
mod recovery;

pub use deriver::{CachedIdentity, IdentityDeriver};
pub use principal::{base32_decode, base32_encode, crc32, Principal, ED25519_DER_PREFIX};
pub use recovery::{normalize, RecoveryPhrase, MIN_WORD_LEN, WORD_COUNT};

use zeroize::Zeroizing;

use crate::crypto::{self, Signature, SigningKeyPair, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use crate::error::{Error, Result};

/// An Ed25519 key pair together with its principal
///
/// ## Security
///
/// - Contains the private key; never log or serialize it casually
/// - Key material is zeroized when dropped
pub struct DerivedIdentity {
    keypair: SigningKeyPair,
    principal: Principal,
}

impl DerivedIdentity {
    /// Build from a 32-byte seed
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Self {
        let keypair = SigningKeyPair::from_bytes(seed);
        let principal = Principal::self_authenticating(&keypair.public_bytes());
        Self { keypair, principal }
    }

    /// Rebuild from stored secret key material (32 or 64 bytes)
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let keypair = SigningKeyPair::from_secret_slice(bytes)
            .map_err(|e| Error::IdentityDerivationFailed(e.to_string()))?;
        let principal = Principal::self_authenticating(&keypair.public_bytes());
        Ok(Self { keypair, principal })
    }

    /// The principal
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Ed25519 public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.keypair.public_bytes()
    }

    /// Ed25519 secret key bytes
    ///
    /// ## Security Warning
    ///
    /// Only for the identity cache and the session slot.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        self.keypair.secret_bytes()
    }

    /// Sign a message (used by backend connectors to authenticate calls)
    pub fn sign(&self, message: &[u8]) -> Signature {
        crypto::sign(&self.keypair, message)
    }

    /// Verify a signature made by this identity
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        crypto::verify(&self.keypair.public_bytes(), message, signature)
    }
}

impl Clone for DerivedIdentity {
    fn clone(&self) -> Self {
        Self::from_seed(&self.keypair.secret_bytes())
    }
}

impl std::fmt::Debug for DerivedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedIdentity")
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_and_secret_agree() {
        let identity = DerivedIdentity::from_seed(&[5u8; 32]);
        let restored = DerivedIdentity::from_secret_bytes(identity.secret_bytes().as_slice()).unwrap();

        assert_eq!(identity.principal(), restored.principal());
        assert_eq!(identity.public_key_bytes(), restored.public_key_bytes());
    }

    #[test]
    fn test_bad_secret_material() {
        assert!(matches!(
            DerivedIdentity::from_secret_bytes(&[1u8; 16]),
            Err(Error::IdentityDerivationFailed(_))
        ));
    }

    #[test]
    fn test_principal_is_self_authenticating() {
        let identity = DerivedIdentity::from_seed(&[5u8; 32]);
        assert_eq!(
            identity.principal(),
            &Principal::self_authenticating(&identity.public_key_bytes())
        );
        assert!(!identity.principal().is_anonymous());
    }

    #[test]
    fn test_sign_verify_and_clone() {
        let identity = DerivedIdentity::from_seed(&[5u8; 32]);
        let copy = identity.clone();
        let signature = copy.sign(b"hello");
        assert!(identity.verify(b"hello", &signature).is_ok());
        assert!(identity.verify(b"bye", &signature).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let identity = DerivedIdentity::from_seed(&[5u8; 32]);
        let debug = format!("{:?}", identity);
        assert!(debug.contains("principal"));
        assert!(!debug.contains(&hex::encode([5u8; 32])));
    }
}
