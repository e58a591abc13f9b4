//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `artifact_vault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use artifact_vault_core::VaultConfig;

fn main() {
    println!("artifact_vault_core ping={}", artifact_vault_core::ping());
    println!(
        "artifact_vault_core version={}",
        artifact_vault_core::core_version()
    );
    match VaultConfig::from_env() {
        Ok(config) => println!("artifact_vault_core storage_key={}", config.storage_key),
        Err(err) => {
            eprintln!("artifact_vault_core config_error={err}");
            std::process::exit(1);
        }
    }
}
