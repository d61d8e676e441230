//! # Recovery Phrase Demo
//!
//! Demonstrates recovery phrase generation, validation and deterministic
//! identity derivation.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example recovery_phrase_demo
//! ```

use std::sync::Arc;

use arta_wallet_core::crypto::phrase_hash;
use arta_wallet_core::identity::{IdentityDeriver, RecoveryPhrase};
use arta_wallet_core::mnemonic::MnemonicGenerator;
use arta_wallet_core::storage::MemoryStorage;

fn main() {
    println!("=== Arta Wallet Core: Recovery Phrase Demo ===\n");

    // Step 1: Explain the pipeline
    println!("Step 1: From words to wallet");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                  PHRASE → IDENTITY                          │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │  128 bits entropy ──► 12 BIP39 words                        │");
    println!("  │                                                             │");
    println!("  │  SHA-256(phrase) ──► first 16 bytes = salt                  │");
    println!("  │                                                             │");
    println!("  │  PBKDF2-SHA256(phrase, salt, 100k) ──► Ed25519 seed         │");
    println!("  │                                                             │");
    println!("  │  SHA-224(DER public key) ‖ 0x02 ──► principal               │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    // Step 2: Generate a recovery phrase
    println!("Step 2: Generating new recovery phrase...");

    let generator = MnemonicGenerator::new();
    let phrase = generator.generate().expect("Failed to generate phrase");
    println!("  Source: {}", generator.selected_source());

    let words = phrase.words();
    println!();
    println!("  ┌────────────────────────────────────────────────────────────┐");
    println!("  │                   YOUR RECOVERY PHRASE                     │");
    println!("  ├────────────────────────────────────────────────────────────┤");

    for (i, chunk) in words.chunks(4).enumerate() {
        print!("  │  ");
        for (j, word) in chunk.iter().enumerate() {
            let num = i * 4 + j + 1;
            print!("{:2}. {:10}", num, word);
        }
        println!("  │");
    }

    println!("  └────────────────────────────────────────────────────────────┘");
    println!();

    // Step 3: Validate phrases
    println!("Step 3: Validating phrases...");
    println!();

    let cases = [
        ("Generated phrase", phrase.phrase().to_string()),
        ("Eleven words", words[..11].join(" ")),
        (
            "Shouting with extra spaces",
            format!("  {}  ", phrase.phrase().to_uppercase().replace(' ', "   ")),
        ),
        ("Digits in a word", format!("{} x1y", words[..11].join(" "))),
    ];

    for (label, text) in &cases {
        match RecoveryPhrase::validate(text) {
            Ok(()) => println!("  {:28} [ACCEPTED]", label),
            Err(e) => println!("  {:28} [REJECTED] {}", label, e),
        }
    }
    println!();

    // Step 4: Word suggestions
    println!("Step 4: Word validation and autocomplete...");
    println!();

    for word in ["abandon", "ability", "hello", "crypto", "zebra"] {
        let status = if RecoveryPhrase::is_valid_word(word) {
            "[VALID]  "
        } else {
            "[INVALID]"
        };
        println!("    {} \"{}\"", status, word);
    }
    println!();

    for prefix in ["ab", "cr", "ze", "xyz"] {
        let suggestions = RecoveryPhrase::suggest_words(prefix);
        if suggestions.is_empty() {
            println!("    \"{}\": (no matches)", prefix);
        } else {
            println!("    \"{}\": {:?}", prefix, &suggestions[..suggestions.len().min(5)]);
        }
    }
    println!();

    // Step 5: Deterministic derivation
    println!("Step 5: Deriving the wallet identity...");

    let deriver = IdentityDeriver::new(Arc::new(MemoryStorage::new()));
    let identity = deriver.derive(&phrase).expect("Failed to derive identity");
    println!("  Phrase hash: {}", hex::encode(phrase_hash(phrase.phrase())));
    println!("  Principal:   {}", identity.principal());
    println!();

    let messy = RecoveryPhrase::parse(&cases[2].1).expect("Normalized phrase should parse");
    let again = deriver.derive(&messy).expect("Failed to derive identity");
    if again.principal() == identity.principal() {
        println!("  [OK] Normalized input derives the same principal");
    } else {
        println!("  [FAILED] Principals should be identical!");
    }
    println!();

    println!("=== Example Complete ===");
}
