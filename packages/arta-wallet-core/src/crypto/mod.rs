//! # Cryptography Module
//!
//! All cryptographic primitives used by Arta Wallet Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    IDENTITY KEYS                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Recovery Phrase (12 words)                                    │   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │  ┌─────────────────────────────────────────────────────────┐   │   │
//! │  │  │              Seed (256 bits)                             │   │   │
//! │  │  │   PBKDF2-SHA256, salt = SHA-256(phrase)[..16], 100k     │   │   │
//! │  │  └─────────────────────────────────────────────────────────┘   │   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │                 Ed25519 Signing Key ──► Principal              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 VAULT ENCRYPTION                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Password + salt ──► PBKDF2 ──► HKDF ──► AES-256-GCM key       │   │
//! │  │                                                                 │   │
//! │  │  • 96-bit nonce (random per encryption)                        │   │
//! │  │  • 128-bit authentication tag                                  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Seeds and secret keys are zeroized when dropped
//! 2. **Secure Random**: `rand::rngs::OsRng` for salts and nonces
//! 3. **No Key Reuse**: Fresh salt and nonce for every vault encryption

mod encryption;
mod kdf;
mod keys;
mod signing;

pub use encryption::{decrypt, encrypt, EncryptionKey, Nonce, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use kdf::{
    derive_identity_seed, derive_vault_key, domain, phrase_hash, SEED_PBKDF2_ROUNDS,
    VAULT_PBKDF2_ROUNDS, VAULT_SALT_SIZE,
};
pub use keys::{SigningKeyPair, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};
