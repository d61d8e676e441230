//! # Mnemonic Generator
//!
//! Produces new 12-word recovery phrases.
//!
//! ## Sources
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PHRASE SOURCES                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Standard (Bip39Source)                                                │
//! │    128 bits from CSPRNG → BIP39 checksum → 12 words of 2048            │
//! │                                                                         │
//! │  Fallback (FallbackSource)                                             │
//! │    12 × u32 from CSPRNG, each mod 400 → 12 words of a bundled subset  │
//! │    (~103 bits, no checksum)                                            │
//! │                                                                         │
//! │  Selection                                                             │
//! │    probe standard once at construction; if it works use it first,     │
//! │    otherwise go straight to the fallback. If every source fails,       │
//! │    GenerationFailed; never a short or predictable phrase.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod wordlist;

pub use wordlist::FALLBACK_WORDS;

use bip39::Mnemonic;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::identity::{RecoveryPhrase, WORD_COUNT};

/// Entropy size in bytes for 12 words (128 bits)
const ENTROPY_BYTES: usize = 16;

/// Something that can produce a 12-word phrase
pub trait MnemonicSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Produce a 12-word phrase carrying roughly 128 bits of entropy
    fn generate_128_bit(&self) -> Result<String>;
}

/// Standard BIP39 generation
pub struct Bip39Source<R = OsRng> {
    rng: Mutex<R>,
}

impl Bip39Source<OsRng> {
    /// Source backed by the operating system RNG
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for Bip39Source<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng + Send> Bip39Source<R> {
    /// Source backed by a specific cryptographic RNG
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> MnemonicSource for Bip39Source<R> {
    fn name(&self) -> &'static str {
        "bip39"
    }

    fn generate_128_bit(&self) -> Result<String> {
        let mut entropy = zeroize::Zeroizing::new([0u8; ENTROPY_BYTES]);
        self.rng
            .lock()
            .try_fill_bytes(&mut entropy[..])
            .map_err(|e| Error::GenerationFailed(format!("RNG unavailable: {}", e)))?;

        let mnemonic = Mnemonic::from_entropy(&entropy[..])
            .map_err(|e| Error::GenerationFailed(format!("BIP39 encoding failed: {}", e)))?;

        Ok(mnemonic.to_string())
    }
}

/// Fallback generation from the bundled wordlist
pub struct FallbackSource<R = OsRng> {
    rng: Mutex<R>,
}

impl FallbackSource<OsRng> {
    /// Source backed by the operating system RNG
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for FallbackSource<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng + Send> FallbackSource<R> {
    /// Source backed by a specific cryptographic RNG
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> MnemonicSource for FallbackSource<R> {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn generate_128_bit(&self) -> Result<String> {
        let mut rng = self.rng.lock();
        let mut words = Vec::with_capacity(WORD_COUNT);

        for _ in 0..WORD_COUNT {
            let mut buf = [0u8; 4];
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| Error::GenerationFailed(format!("RNG unavailable: {}", e)))?;
            let index = u32::from_le_bytes(buf) as usize % FALLBACK_WORDS.len();
            words.push(FALLBACK_WORDS[index]);
        }

        Ok(words.join(" "))
    }
}

/// Generates recovery phrases from the best available source
pub struct MnemonicGenerator {
    // Selected source first
    sources: Vec<Box<dyn MnemonicSource>>,
}

impl MnemonicGenerator {
    /// Standard BIP39 source with the bundled fallback
    pub fn new() -> Self {
        Self::with_sources(Box::new(Bip39Source::new()), Box::new(FallbackSource::new()))
    }

    /// Use specific sources; the primary is probed once here
    pub fn with_sources(primary: Box<dyn MnemonicSource>, fallback: Box<dyn MnemonicSource>) -> Self {
        let sources = match primary.generate_128_bit().and_then(|text| check(&text)) {
            Ok(_) => {
                tracing::debug!(source = primary.name(), "Selected mnemonic source");
                vec![primary, fallback]
            }
            Err(e) => {
                tracing::warn!(
                    source = primary.name(),
                    fallback = fallback.name(),
                    error = %e,
                    "Standard mnemonic source unavailable, using fallback"
                );
                vec![fallback]
            }
        };

        Self { sources }
    }

    /// Name of the source tried first
    pub fn selected_source(&self) -> &'static str {
        self.sources.first().map(|s| s.name()).unwrap_or("none")
    }

    /// Generate a new 12-word phrase
    ///
    /// ## Errors
    ///
    /// `GenerationFailed` (retryable) when no source can produce a phrase.
    pub fn generate(&self) -> Result<RecoveryPhrase> {
        for source in &self.sources {
            match source.generate_128_bit().and_then(|text| check(&text)) {
                Ok(phrase) => return Ok(phrase),
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Mnemonic source failed");
                }
            }
        }

        Err(Error::GenerationFailed(
            "no secure entropy source is available".into(),
        ))
    }
}

impl Default for MnemonicGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject anything that is not 12 well-formed words
fn check(text: &str) -> Result<RecoveryPhrase> {
    RecoveryPhrase::parse(text)
        .map_err(|e| Error::GenerationFailed(format!("source produced an invalid phrase: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// RNG that is always unavailable
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!("only try_fill_bytes is used")
        }
        fn next_u64(&mut self) -> u64 {
            unreachable!("only try_fill_bytes is used")
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unreachable!("only try_fill_bytes is used")
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for FailingRng {}

    /// Source that returns a too-short phrase
    struct ShortSource;

    impl MnemonicSource for ShortSource {
        fn name(&self) -> &'static str {
            "short"
        }
        fn generate_128_bit(&self) -> Result<String> {
            Ok("abandon ability able".into())
        }
    }

    #[test]
    fn test_generates_twelve_words() {
        let generator = MnemonicGenerator::new();
        assert_eq!(generator.selected_source(), "bip39");

        let phrase = generator.generate().unwrap();
        assert_eq!(phrase.words().len(), 12);
        // Standard output carries a valid BIP39 checksum
        assert!(Mnemonic::parse(phrase.phrase()).is_ok());
    }

    #[test]
    fn test_phrases_are_unique() {
        let generator = MnemonicGenerator::new();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a.phrase(), b.phrase());
    }

    #[test]
    fn test_fallback_selected_when_standard_unavailable() {
        let generator = MnemonicGenerator::with_sources(
            Box::new(Bip39Source::with_rng(FailingRng)),
            Box::new(FallbackSource::with_rng(StdRng::seed_from_u64(7))),
        );
        assert_eq!(generator.selected_source(), "fallback");

        let phrase = generator.generate().unwrap();
        assert_eq!(phrase.words().len(), 12);
        for word in phrase.words() {
            assert!(FALLBACK_WORDS.contains(&word));
        }
    }

    #[test]
    fn test_invalid_output_never_returned() {
        let generator = MnemonicGenerator::with_sources(
            Box::new(ShortSource),
            Box::new(FallbackSource::with_rng(StdRng::seed_from_u64(1))),
        );
        assert_eq!(generator.selected_source(), "fallback");
        assert_eq!(generator.generate().unwrap().words().len(), 12);
    }

    #[test]
    fn test_all_sources_failing() {
        let generator = MnemonicGenerator::with_sources(
            Box::new(Bip39Source::with_rng(FailingRng)),
            Box::new(FallbackSource::with_rng(FailingRng)),
        );

        let err = generator.generate().unwrap_err();
        assert!(matches!(err, Error::GenerationFailed(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fallback_words_are_bip39() {
        let list = bip39::Language::English.word_list();
        assert_eq!(FALLBACK_WORDS.len(), 400);
        for word in FALLBACK_WORDS {
            assert!(list.contains(&word), "{} not in BIP39 list", word);
            assert!(word.len() >= 3);
        }
    }
}
