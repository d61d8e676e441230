//! # Principals
//!
//! The self-authenticating identifier a wallet presents to the backend.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PRINCIPAL DERIVATION                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Ed25519 public key (32 bytes)                                         │
//! │        │                                                                │
//! │        ▼  DER SubjectPublicKeyInfo                                      │
//! │  302a300506032b6570032100 ‖ public key    (44 bytes)                   │
//! │        │                                                                │
//! │        ▼  SHA-224                                                       │
//! │  digest (28 bytes) ‖ 0x02                 (29 bytes, self-auth tag)    │
//! │                                                                         │
//! │  Text form:                                                            │
//! │    CRC-32(bytes) big-endian ‖ bytes                                    │
//! │        │                                                                │
//! │        ▼  base32 (RFC 4648), lowercase, no padding                      │
//! │    groups of 5 characters joined by '-'                                │
//! │                                                                         │
//! │    e.g.  2vxsx-fae   (anonymous principal, bytes = [0x04])            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! CRC-32 and base32 are implemented here; both are a few lines and fixed
//! by the textual format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha224};

use crate::error::{Error, Result};

/// DER prefix of an Ed25519 SubjectPublicKeyInfo
pub const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Maximum length of a principal in bytes
pub const MAX_PRINCIPAL_LEN: usize = 29;

const SELF_AUTHENTICATING_TAG: u8 = 0x02;
const ANONYMOUS_TAG: u8 = 0x04;
const CHECKSUM_LEN: usize = 4;
const GROUP_LEN: usize = 5;
const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// An opaque principal identifier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal {
    bytes: Vec<u8>,
}

impl Principal {
    /// Self-authenticating principal of an Ed25519 public key
    pub fn self_authenticating(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha224::new();
        hasher.update(ED25519_DER_PREFIX);
        hasher.update(public_key);

        let mut bytes = hasher.finalize().to_vec();
        bytes.push(SELF_AUTHENTICATING_TAG);
        Self { bytes }
    }

    /// The anonymous principal
    pub fn anonymous() -> Self {
        Self {
            bytes: vec![ANONYMOUS_TAG],
        }
    }

    /// Build from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(Error::InvalidPrincipal(format!(
                "Principal must be at most {} bytes, got {}",
                MAX_PRINCIPAL_LEN,
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Parse the textual form, verifying the checksum
    pub fn from_text(text: &str) -> Result<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        let compact: String = lowered.chars().filter(|c| *c != '-').collect();

        let decoded = base32_decode(&compact)
            .ok_or_else(|| Error::InvalidPrincipal(format!("Not base32: {}", text)))?;

        if decoded.len() < CHECKSUM_LEN {
            return Err(Error::InvalidPrincipal(format!("Too short: {}", text)));
        }

        let (checksum, bytes) = decoded.split_at(CHECKSUM_LEN);
        if checksum != crc32(bytes).to_be_bytes() {
            return Err(Error::InvalidPrincipal(format!("Checksum mismatch: {}", text)));
        }

        let principal = Self::from_slice(bytes)?;
        if principal.to_text() != lowered {
            return Err(Error::InvalidPrincipal(format!(
                "Not in canonical form: {}",
                text
            )));
        }

        Ok(principal)
    }

    /// Render the textual form
    pub fn to_text(&self) -> String {
        let mut checked = Vec::with_capacity(CHECKSUM_LEN + self.bytes.len());
        checked.extend_from_slice(&crc32(&self.bytes).to_be_bytes());
        checked.extend_from_slice(&self.bytes);

        let encoded = base32_encode(&checked);
        encoded
            .as_bytes()
            .chunks(GROUP_LEN)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this is the anonymous principal
    pub fn is_anonymous(&self) -> bool {
        self.bytes == [ANONYMOUS_TAG]
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(&text).map_err(serde::de::Error::custom)
    }
}

/// CRC-32 (IEEE 802.3, reflected, polynomial 0xEDB88320)
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// RFC 4648 base32, lowercase, no padding
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

/// Decode lowercase unpadded base32; `None` on any character outside the alphabet
pub fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for c in text.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Some(out)
}
