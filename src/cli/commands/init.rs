//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::DEFAULT_CONFIG_PATH;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing machtry-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Outside Google Cloud, set GOOGLE_APPLICATION_CREDENTIALS");
                println!("     or run `gcloud auth application-default login`");
                println!("  3. Validate configuration: machtry-export validate-config");
                println!("  4. Preview the run: machtry-export export --dry-run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

/// Sample configuration with the production values
pub fn sample_config() -> &'static str {
    r#"# machtry-export configuration
#
# Every value below is the built-in default; delete what you don't change.
# ${VAR} references are substituted from the environment, and every scalar can
# be overridden with MACHTRY_<SECTION>_<KEY> (e.g. MACHTRY_STORAGE_BUCKET).

[application]
log_level = "info"
dry_run = false

[warehouse]
project = "moz-fx-data-taskclu-prod-8fbf"
dataset = "taskclusteretl"
# Must match the dataset's location
location = "US"
poll_interval_ms = 1000
job_timeout_secs = 600

[storage]
bucket = "mozilla-mach-data"

[auth]
# Leave unset to use Application Default Credentials.
# credentials_path = "/path/to/service-account.json"
# Inline key JSON is easiest passed as MACHTRY_AUTH_CREDENTIALS_JSON.

[server]
host = "0.0.0.0"
port = 8080

[logging]
# "json" for Cloud Logging
format = "text"
local_enabled = false
local_path = "/var/log/machtry-export"
local_rotation = "daily"

# Destinations ending in .csv are exported as CSV, all others as
# newline-delimited JSON.
[[tables]]
table = "task_duration_estimates"
destination = "task_duration_history.json"

[[tables]]
table = "calculated_machtry_quantiles"
destination = "machtry_quantiles.csv"
"#
}
