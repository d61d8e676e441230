//! Recovery phrase encryption formats.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      VAULT CIPHERTEXT FORMATS                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  v2 (written by this crate)                                            │
//! │    "v2:" + base64( salt[16] ‖ nonce[12] ‖ AES-256-GCM(phrase) ‖ tag ) │
//! │    key = HKDF(PBKDF2-SHA256(password, salt, 100k), "arta-vault-key-v1")│
//! │                                                                         │
//! │  legacy (read only)                                                    │
//! │    base64( phrase[j] XOR k[j mod 32] )                                 │
//! │    k[i] = password[i mod len] + i / len   (wrapping, i < 32)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Legacy blobs carry no authentication. A wrong password produces bytes
//! that are not a phrase, which is reported the same way as a failed tag.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use crate::crypto::{self, EncryptionKey, Nonce, NONCE_SIZE, TAG_SIZE, VAULT_SALT_SIZE};
use crate::error::{Error, Result};
use crate::identity::RecoveryPhrase;

/// Prefix marking the authenticated format
pub const V2_PREFIX: &str = "v2:";

/// Associated data bound into every v2 ciphertext
const V2_AAD: &[u8] = b"arta-wallet-record";

const LEGACY_KEY_LEN: usize = 32;

/// Whether a blob uses the legacy unauthenticated format
pub fn is_legacy(blob: &str) -> bool {
    !blob.starts_with(V2_PREFIX)
}

/// Encrypt a phrase under a password
///
/// Salt and nonce are random, so encrypting twice gives different output.
pub fn encrypt(phrase: &RecoveryPhrase, password: &str) -> Result<String> {
    let mut salt = [0u8; VAULT_SALT_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| Error::EncryptionFailed(format!("No secure randomness: {}", e)))?;

    let key = EncryptionKey::from_bytes(*crypto::derive_vault_key(password, &salt)?);
    let (nonce, ciphertext) = crypto::encrypt(&key, phrase.phrase().as_bytes(), V2_AAD)?;

    let mut payload = Vec::with_capacity(VAULT_SALT_SIZE + NONCE_SIZE + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(nonce.as_bytes());
    payload.extend_from_slice(&ciphertext);

    Ok(format!("{}{}", V2_PREFIX, STANDARD.encode(payload)))
}

/// Decrypt a blob in either format
///
/// ## Errors
///
/// - `DecryptionFailed`: the blob is structurally invalid
/// - `IntegrityCheckFailed`: wrong password or modified ciphertext
pub fn decrypt(blob: &str, password: &str) -> Result<RecoveryPhrase> {
    match blob.strip_prefix(V2_PREFIX) {
        Some(encoded) => decrypt_v2(encoded, password),
        None => decrypt_legacy(blob, password),
    }
}

fn decrypt_v2(encoded: &str, password: &str) -> Result<RecoveryPhrase> {
    let payload = STANDARD.decode(encoded.trim())?;
    if payload.len() < VAULT_SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(Error::DecryptionFailed(format!(
            "ciphertext too short: {} bytes",
            payload.len()
        )));
    }

    let (salt, rest) = payload.split_at(VAULT_SALT_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);

    let key = EncryptionKey::from_bytes(*crypto::derive_vault_key(password, salt)?);
    let plaintext = zeroize::Zeroizing::new(crypto::decrypt(
        &key,
        &Nonce::from_bytes(nonce),
        ciphertext,
        V2_AAD,
    )?);

    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| Error::DecryptionFailed("plaintext is not UTF-8".into()))?;
    RecoveryPhrase::parse(text)
        .map_err(|_| Error::DecryptionFailed("plaintext is not a recovery phrase".into()))
}

fn decrypt_legacy(encoded: &str, password: &str) -> Result<RecoveryPhrase> {
    if password.is_empty() {
        return Err(Error::DecryptionFailed("empty password".into()));
    }

    let mut bytes = zeroize::Zeroizing::new(STANDARD.decode(encoded.trim())?);
    if bytes.is_empty() {
        return Err(Error::DecryptionFailed("empty ciphertext".into()));
    }

    let key = legacy_key(password);
    for (j, byte) in bytes.iter_mut().enumerate() {
        *byte ^= key[j % LEGACY_KEY_LEN];
    }

    let text = std::str::from_utf8(&bytes).map_err(|_| {
        Error::IntegrityCheckFailed("legacy ciphertext did not decrypt to text".into())
    })?;
    RecoveryPhrase::parse(text).map_err(|_| {
        Error::IntegrityCheckFailed("legacy ciphertext did not decrypt to a phrase".into())
    })
}

fn legacy_key(password: &str) -> zeroize::Zeroizing<[u8; LEGACY_KEY_LEN]> {
    let pw = password.as_bytes();
    let mut key = zeroize::Zeroizing::new([0u8; LEGACY_KEY_LEN]);
    for (i, k) in key.iter_mut().enumerate() {
        *k = pw[i % pw.len()].wrapping_add((i / pw.len()) as u8);
    }
    key
}

/// Produce a legacy blob, for exercising migration
#[cfg(test)]
pub(crate) fn encrypt_legacy(phrase: &RecoveryPhrase, password: &str) -> String {
    let key = legacy_key(password);
    let bytes: Vec<u8> = phrase
        .phrase()
        .bytes()
        .enumerate()
        .map(|(j, b)| b ^ key[j % LEGACY_KEY_LEN])
        .collect();
    STANDARD.encode(bytes)
}
