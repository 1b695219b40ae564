//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MACHTRY_*` environment overrides for every scalar setting
//! - Defaults for every section: without a file the exporter runs the
//!   production table mapping
//! - Validation of identifiers and of the table list before any export starts
//!
//! # Example Configuration
//!
//! ```toml
//! [warehouse]
//! project = "moz-fx-data-taskclu-prod-8fbf"
//! dataset = "taskclusteretl"
//! location = "US"
//! job_timeout_secs = 600
//!
//! [storage]
//! bucket = "mozilla-mach-data"
//!
//! [auth]
//! credentials_path = "${MACHTRY_KEY_FILE}"
//!
//! [[tables]]
//! table = "task_duration_estimates"
//! destination = "task_duration_history.json"
//!
//! [[tables]]
//! table = "calculated_machtry_quantiles"
//! destination = "machtry_quantiles.csv"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use machtry_export::config::load_config;
//!
//! # fn example() {
//! match load_config("machtry-export.toml") {
//!     Ok(config) => println!("{} tables configured", config.tables.len()),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, parse_config, DEFAULT_CONFIG_PATH};
pub use schema::{
    ApplicationConfig, AuthConfig, ExporterConfig, LoggingConfig, ServerConfig, StorageConfig,
    TableConfig, WarehouseConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
