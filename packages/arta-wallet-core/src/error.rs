//! # Error Handling
//!
//! This module provides the error types for Arta Wallet Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Identity Errors                                                   │
//! │  │   ├── GenerationFailed          - No secure entropy source          │
//! │  │   ├── ValidationFailed          - Bad word count, bad input         │
//! │  │   ├── IdentityDerivationFailed  - Malformed seed or key material    │
//! │  │   └── InvalidPrincipal          - Bad principal text                │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed          - AEAD encryption failed            │
//! │  │   ├── DecryptionFailed          - Structurally invalid ciphertext   │
//! │  │   ├── IntegrityCheckFailed      - Wrong password / tampered data    │
//! │  │   ├── InvalidKey                - Invalid key format/length         │
//! │  │   └── VerificationFailed        - Bad signature                     │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageReadError / StorageWriteError                          │
//! │  │   ├── StorageCorrupted          - Unparseable persisted data        │
//! │  │   └── WalletNotFound            - No wallet with that name          │
//! │  │                                                                      │
//! │  └── Session Errors                                                    │
//! │      ├── NoSession                 - No active session                 │
//! │      ├── SessionBusy               - Another auth flow is running      │
//! │      ├── BackendConnectionFailed   - Backend collaborator failed       │
//! │      └── Timeout                   - Backend call exceeded its bound   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//!
//! Crypto and storage errors are turned into user-facing text at the
//! component boundary with [`Error::user_message`]. Only
//! `IntegrityCheckFailed` and `ValidationFailed` demand user correction
//! (re-enter password, re-enter phrase); see [`Error::requires_user_action`].

use thiserror::Error;

/// Result type alias for Arta Wallet Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Arta Wallet Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Identity Errors (200-299)
    // ========================================================================

    /// No secure entropy source could produce a recovery phrase
    #[error("Failed to generate recovery phrase: {0}")]
    GenerationFailed(String),

    /// User input failed validation (word count, verification phrase, ...)
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Key pair construction from derived material failed
    #[error("Failed to derive identity: {0}")]
    IdentityDerivationFailed(String),

    /// Principal text could not be parsed
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Ciphertext is structurally invalid
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Decrypted data does not match what was stored
    #[error("Integrity check failed: {0}")]
    IntegrityCheckFailed(String),

    /// Invalid key format or length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    VerificationFailed,

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Failed to read from storage
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to storage
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    /// Persisted data could not be interpreted
    #[error("Data corruption detected: {0}")]
    StorageCorrupted(String),

    /// No wallet record with the given name
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    // ========================================================================
    // Session Errors (500-599)
    // ========================================================================

    /// No session is active
    #[error("No active session. Unlock a wallet first.")]
    NoSession,

    /// Another authentication flow is still running
    #[error("Another wallet operation is in progress.")]
    SessionBusy,

    /// The backend collaborator failed
    #[error("Backend connection failed: {0}")]
    BackendConnectionFailed(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 200-299: Identity
    /// - 300-399: Crypto
    /// - 400-499: Storage
    /// - 500-599: Session
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Identity (200-299)
            Error::GenerationFailed(_) => 200,
            Error::ValidationFailed(_) => 201,
            Error::IdentityDerivationFailed(_) => 202,
            Error::InvalidPrincipal(_) => 203,

            // Crypto (300-399)
            Error::EncryptionFailed(_) => 300,
            Error::DecryptionFailed(_) => 301,
            Error::IntegrityCheckFailed(_) => 302,
            Error::InvalidKey(_) => 303,
            Error::VerificationFailed => 304,

            // Storage (400-499)
            Error::StorageReadError(_) => 400,
            Error::StorageWriteError(_) => 401,
            Error::StorageCorrupted(_) => 402,
            Error::WalletNotFound(_) => 403,

            // Session (500-599)
            Error::NoSession => 500,
            Error::SessionBusy => 501,
            Error::BackendConnectionFailed(_) => 502,
            Error::Timeout(_) => 503,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
            Error::DeserializationError(_) => 901,
            Error::Internal(_) => 902,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can be resolved by simply retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::GenerationFailed(_)
                | Error::Timeout(_)
                | Error::BackendConnectionFailed(_)
                | Error::SessionBusy
        )
    }

    /// Check if this error requires user correction before continuing
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::IntegrityCheckFailed(_) | Error::ValidationFailed(_)
        )
    }

    /// Message suitable for showing to the user
    ///
    /// Never includes key material; validation messages are passed through
    /// because they describe the user's own input.
    pub fn user_message(&self) -> String {
        match self {
            Error::GenerationFailed(_) => {
                "Could not generate a recovery phrase. Please try again.".into()
            }
            Error::ValidationFailed(reason) => reason.clone(),
            Error::DecryptionFailed(_) | Error::IntegrityCheckFailed(_) => {
                "Invalid password or corrupted wallet data.".into()
            }
            Error::IdentityDerivationFailed(_) | Error::InvalidKey(_) => {
                "Could not restore the wallet identity. The wallet may be corrupted.".into()
            }
            Error::WalletNotFound(name) => format!("No wallet named \"{}\" was found.", name),
            Error::SessionBusy => "Please wait for the current operation to finish.".into(),
            Error::NoSession => "Please unlock a wallet first.".into(),
            Error::Timeout(_) => "The network took too long to respond. Please try again.".into(),
            Error::BackendConnectionFailed(_) => {
                "Could not reach the payment network. Please try again.".into()
            }
            _ => "Something went wrong while accessing wallet storage.".into(),
        }
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::DeserializationError(err.to_string())
        } else {
            Error::SerializationError(err.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageReadError(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::DecryptionFailed(format!("Invalid base64: {}", err))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::GenerationFailed("test".into()).code(), 200);
        assert_eq!(Error::EncryptionFailed("test".into()).code(), 300);
        assert_eq!(Error::StorageReadError("test".into()).code(), 400);
        assert_eq!(Error::NoSession.code(), 500);
        assert_eq!(Error::Internal("test".into()).code(), 902);
    }

    #[test]
    fn test_user_action_errors() {
        assert!(Error::IntegrityCheckFailed("x".into()).requires_user_action());
        assert!(Error::ValidationFailed("x".into()).requires_user_action());
        assert!(!Error::DecryptionFailed("x".into()).requires_user_action());
        assert!(!Error::Timeout("x".into()).requires_user_action());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Timeout("test".into()).is_recoverable());
        assert!(Error::GenerationFailed("test".into()).is_recoverable());
        assert!(!Error::IntegrityCheckFailed("test".into()).is_recoverable());
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = Error::IntegrityCheckFailed("principal mismatch abc".into());
        let msg = err.user_message();
        assert!(msg.contains("Invalid password"));
        assert!(!msg.contains("abc"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: Error = serde_json::from_str::<Vec<u8>>("not json").unwrap_err().into();
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
