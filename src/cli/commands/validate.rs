//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::adapters::auth::CredentialSource;
use crate::config::load_config_or_default;
use crate::config::DEFAULT_CONFIG_PATH;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("🔍 Validating configuration: {shown_path}");
        println!();

        // Loading already validates.
        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Project: {}", config.warehouse.project);
        println!("  Dataset: {}", config.warehouse.dataset);
        println!("  Location: {}", config.warehouse.location);
        println!("  Bucket: {}", config.storage.bucket);
        println!(
            "  Credentials: {}",
            CredentialSource::from_config(&config.auth)
        );
        println!("  Job Timeout: {}s", config.warehouse.job_timeout_secs);
        println!("  HTTP Trigger: {}", config.server.bind_address());
        println!("  Tables:");
        for table in &config.tables {
            match table.to_export() {
                Ok(export) => println!("    - {export}"),
                Err(e) => println!("    - {} (invalid: {e})", table.table),
            }
        }
        println!();
        Ok(0)
    }
}
