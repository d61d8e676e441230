//! # Wallet Lifecycle Demo
//!
//! Walks a wallet through create, logout, login and restore against the
//! offline backend. Records are kept in `ARTA_DATA_DIR`, or in a temporary
//! directory when it is unset.
//!
//! ## Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --example wallet_lifecycle
//! ARTA_DATA_DIR=/tmp/arta cargo run --example wallet_lifecycle
//! ```

use std::sync::Arc;

use arta_wallet_core::logging::{init_tracing, DEFAULT_FILTER};
use arta_wallet_core::{
    FileStorage, MnemonicGenerator, OfflineConnector, SessionController, SessionState,
    WalletConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> arta_wallet_core::Result<()> {
    init_tracing(DEFAULT_FILTER);
    println!("=== Arta Wallet Core: Wallet Lifecycle Demo ===\n");

    let info = arta_wallet_core::build_info();
    println!("Build: v{} ({}, {})\n", info.version, info.target, info.profile);

    let config = WalletConfig::from_env();
    println!(
        "Backend: {} (canister {}, {:?})",
        config.backend.host, config.backend.canister_id, config.backend.network
    );

    // Keep the temp dir alive until the end of main
    let scratch;
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => {
            scratch = tempfile::tempdir().expect("Failed to create temp dir");
            scratch.path().to_path_buf()
        }
    };
    println!("Data directory: {}\n", data_dir.display());
    let storage = Arc::new(FileStorage::open(&data_dir)?);

    // Step 1: First launch
    println!("Step 1: Starting up...");
    let controller = SessionController::new(config.clone(), OfflineConnector::new(), storage.clone());
    let state = controller.start().await?;
    println!("  State: {:?}", state);
    println!();

    // Step 2: Create a wallet
    println!("Step 2: Creating a wallet...");
    let phrase = MnemonicGenerator::new().generate()?;
    println!("  Write these down: {}", phrase.phrase());
    controller.verify_backup(&phrase, &phrase.phrase().to_uppercase())?;
    println!("  [OK] Backup confirmed");

    let info = controller
        .create_wallet("Daily spending", &phrase, "correct horse battery")
        .await?;
    println!("  Principal: {}", info.principal);
    println!();

    // Step 3: Wrong password
    println!("Step 3: Logging out and trying a wrong password...");
    controller.logout().await?;
    match controller.login("Daily spending", "wrong horse battery").await {
        Ok(_) => println!("  [FAILED] Wrong password was accepted!"),
        Err(e) => println!("  [OK] Rejected: {}", e.user_message()),
    }
    println!();

    // Step 4: Correct password
    println!("Step 4: Logging in...");
    let again = controller.login("Daily spending", "correct horse battery").await?;
    if again.principal == info.principal {
        println!("  [OK] Same principal as at creation");
    } else {
        println!("  [FAILED] Principal changed!");
    }
    drop(controller);
    println!();

    // Step 5: Restart
    println!("Step 5: Restarting and restoring the session...");
    let controller = SessionController::new(config, OfflineConnector::new(), storage);
    match controller.start().await? {
        SessionState::Active(restored) => {
            println!("  [OK] Restored wallet \"{}\"", restored.wallet_name)
        }
        other => println!("  [FAILED] Expected an active session, got {:?}", other),
    }

    for record in controller.vault().list()? {
        println!("  Saved: {} ({})", record.name, record.public_identifier);
    }
    println!();

    println!("=== Example Complete ===");
    Ok(())
}
