//! # Recovery Phrase
//!
//! The 12-word phrase a wallet identity is derived from.
//!
//! ## Canonical Form
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PHRASE NORMALIZATION                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  User input:   "  Abandon   ABILITY able\tabout ... accident \n"       │
//! │                              │                                          │
//! │                              ▼  trim, lowercase, collapse whitespace    │
//! │  Canonical:    "abandon ability able about ... accident"               │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  Validation:   exactly 12 words, each [a-z]{3,}                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation is deliberately a shape check, not a BIP39 checksum check:
//! phrases produced by the fallback source carry no checksum and must still
//! import. The canonical text is what key derivation consumes, so two inputs
//! that normalize to the same text always yield the same identity.
//!
//! ## Security Considerations
//!
//! | Aspect | Measure |
//! |--------|---------|
//! | Memory | Zeroized on drop |
//! | Display | `Debug` is redacted; show once, never log |
//! | Storage | Only ever persisted encrypted, through the vault |

use bip39::Language;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Number of words in a recovery phrase
pub const WORD_COUNT: usize = 12;

/// Minimum length of a single word
pub const MIN_WORD_LEN: usize = 3;

/// Maximum number of autocomplete suggestions
const MAX_SUGGESTIONS: usize = 10;

/// A normalized 12-word recovery phrase
///
/// ## Security Warning
///
/// - This phrase can fully recover the wallet identity
/// - Should be shown to the user exactly once
/// - Should never be logged or stored in plaintext
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase {
    /// Canonical text: lowercase words joined by single spaces
    canonical: String,
}

impl RecoveryPhrase {
    /// Parse and normalize user input
    ///
    /// ## Validation
    ///
    /// - Must be exactly 12 words after normalization
    /// - Every word must be lowercase ASCII letters, at least 3 long
    pub fn parse(input: &str) -> Result<Self> {
        let canonical = normalize(input);
        let count = canonical.split(' ').filter(|w| !w.is_empty()).count();

        if count != WORD_COUNT {
            return Err(Error::ValidationFailed(format!(
                "Recovery phrase must be exactly {} words, got {}",
                WORD_COUNT, count
            )));
        }

        if let Some(position) = canonical.split(' ').position(|w| !is_well_formed(w)) {
            return Err(Error::ValidationFailed(format!(
                "Word {} of the recovery phrase is not a valid word",
                position + 1
            )));
        }

        Ok(Self { canonical })
    }

    /// Build from a list of words
    pub fn from_words(words: &[&str]) -> Result<Self> {
        if words.len() != WORD_COUNT {
            return Err(Error::ValidationFailed(format!(
                "Recovery phrase must be exactly {} words, got {}",
                WORD_COUNT,
                words.len()
            )));
        }

        Self::parse(&words.join(" "))
    }

    /// Get the words in order
    pub fn words(&self) -> Vec<&str> {
        self.canonical.split(' ').collect()
    }

    /// Get the canonical phrase text
    ///
    /// ## Security Warning
    ///
    /// Only use this for display to the user or for key derivation.
    pub fn phrase(&self) -> &str {
        &self.canonical
    }

    /// Check a re-typed backup against this phrase
    ///
    /// The typed text is normalized first, so case and spacing differences
    /// are accepted.
    pub fn verify_backup(&self, typed: &str) -> Result<()> {
        if normalize(typed) == self.canonical {
            Ok(())
        } else {
            Err(Error::ValidationFailed(
                "The recovery phrase you entered does not match. Please check each word.".into(),
            ))
        }
    }

    /// Validate a phrase without keeping it
    pub fn validate(input: &str) -> Result<()> {
        Self::parse(input).map(|_| ())
    }

    /// Check if a single word is in the BIP39 English wordlist
    pub fn is_valid_word(word: &str) -> bool {
        let word_lower = word.trim().to_lowercase();
        Language::English
            .word_list()
            .binary_search(&word_lower.as_str())
            .is_ok()
    }

    /// Get word suggestions for autocomplete
    ///
    /// Returns up to ten BIP39 words starting with the given prefix.
    pub fn suggest_words(prefix: &str) -> Vec<&'static str> {
        let prefix_lower = prefix.trim().to_lowercase();
        if prefix_lower.is_empty() {
            return vec![];
        }

        Language::English
            .word_list()
            .iter()
            .filter(|w| w.starts_with(&prefix_lower))
            .take(MAX_SUGGESTIONS)
            .copied()
            .collect()
    }
}

/// Trim, lowercase and collapse runs of whitespace to one space
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_well_formed(word: &str) -> bool {
    word.len() >= MIN_WORD_LEN && word.bytes().all(|b| b.is_ascii_lowercase())
}

// Prevent accidental logging
impl std::fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoveryPhrase([REDACTED])")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon ability able about above absent absorb abstract absurd abuse access accident";

    #[test]
    fn test_parse_valid_phrase() {
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        assert_eq!(phrase.words().len(), 12);
        assert_eq!(phrase.phrase(), PHRASE);
    }

    #[test]
    fn test_normalization() {
        let messy = "  Abandon   ABILITY able\tabout above absent absorb abstract absurd abuse access Accident \n";
        let phrase = RecoveryPhrase::parse(messy).unwrap();
        assert_eq!(phrase.phrase(), PHRASE);
        assert_eq!(phrase, RecoveryPhrase::parse(PHRASE).unwrap());
    }

    #[test]
    fn test_wrong_word_count() {
        let eleven = "abandon ability able about above absent absorb abstract absurd abuse access";
        assert!(matches!(
            RecoveryPhrase::parse(eleven),
            Err(Error::ValidationFailed(_))
        ));

        let thirteen = format!("{} zoo", PHRASE);
        assert!(RecoveryPhrase::parse(&thirteen).is_err());
        assert!(RecoveryPhrase::parse("").is_err());
    }

    #[test]
    fn test_malformed_words() {
        let short_word = PHRASE.replace("able", "ab");
        assert!(matches!(
            RecoveryPhrase::parse(&short_word),
            Err(Error::ValidationFailed(_))
        ));

        let digits = PHRASE.replace("able", "abl3");
        assert!(RecoveryPhrase::parse(&digits).is_err());
    }

    #[test]
    fn test_checksum_not_required() {
        // Twelve valid words without a valid BIP39 checksum
        let phrase = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo";
        assert!(RecoveryPhrase::parse(phrase).is_ok());
    }

    #[test]
    fn test_from_words() {
        let words: Vec<&str> = PHRASE.split(' ').collect();
        let phrase = RecoveryPhrase::from_words(&words).unwrap();
        assert_eq!(phrase.phrase(), PHRASE);
        assert!(RecoveryPhrase::from_words(&words[..11]).is_err());
    }

    #[test]
    fn test_verify_backup() {
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        assert!(phrase.verify_backup(&PHRASE.to_uppercase()).is_ok());
        assert!(matches!(
            phrase.verify_backup(&PHRASE.replace("accident", "account")),
            Err(Error::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_is_valid_word() {
        assert!(RecoveryPhrase::is_valid_word("abandon"));
        assert!(RecoveryPhrase::is_valid_word("Zoo"));
        assert!(!RecoveryPhrase::is_valid_word("notaword"));
    }

    #[test]
    fn test_suggest_words() {
        let suggestions = RecoveryPhrase::suggest_words("ab");
        assert!(suggestions.contains(&"abandon"));
        assert!(suggestions.contains(&"ability"));
        assert!(suggestions.len() <= 10);
        assert!(RecoveryPhrase::suggest_words("").is_empty());
    }

    #[test]
    fn test_debug_redacts() {
        let phrase = RecoveryPhrase::parse(PHRASE).unwrap();
        let debug = format!("{:?}", phrase);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("abandon"));
    }
}
