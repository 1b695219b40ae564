//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) yields the
//! production export: the two Mach Try tables of `taskclusteretl`, published
//! to `mozilla-mach-data`.

use crate::config::SecretString;
use crate::core::export::plan::{ExportPlan, JobWaitPolicy};
use crate::domain::ids::{BucketName, DatasetId, ObjectName, ProjectId, TableId};
use crate::domain::TableExport;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Default destination bucket
pub const DEFAULT_BUCKET: &str = "mozilla-mach-data";

/// Default warehouse project
pub const DEFAULT_PROJECT: &str = "moz-fx-data-taskclu-prod-8fbf";

/// Default dataset
pub const DEFAULT_DATASET: &str = "taskclusteretl";

/// Default execution location; must match the dataset's location
pub const DEFAULT_LOCATION: &str = "US";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// BigQuery settings
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Cloud Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Credential settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP trigger settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tables to export, in order
    #[serde(default = "default_tables")]
    pub tables: Vec<TableConfig>,
}

impl ExporterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.warehouse.validate()?;
        self.storage.validate()?;
        self.auth.validate()?;
        self.server.validate()?;
        self.logging.validate()?;
        self.validate_tables()?;
        Ok(())
    }

    fn validate_tables(&self) -> Result<(), String> {
        if self.tables.is_empty() {
            return Err("At least one [[tables]] entry is required".to_string());
        }

        let mut destinations = HashSet::new();
        for table in &self.tables {
            let export = table.to_export()?;
            if export.destination.is_temporary() {
                return Err(format!(
                    "Destination '{}' uses the reserved temporary suffix",
                    export.destination
                ));
            }
            if !destinations.insert(export.destination.clone()) {
                return Err(format!(
                    "Destination '{}' is configured more than once",
                    export.destination
                ));
            }
        }

        Ok(())
    }

    /// Builds the typed export plan
    ///
    /// # Errors
    ///
    /// Returns an error if any identifier fails validation
    pub fn export_plan(&self) -> Result<ExportPlan, String> {
        self.validate()?;

        let tables = self
            .tables
            .iter()
            .map(TableConfig::to_export)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExportPlan {
            project: ProjectId::new(&self.warehouse.project)?,
            dataset: DatasetId::new(&self.warehouse.dataset)?,
            location: self.warehouse.location.clone(),
            bucket: BucketName::new(&self.storage.bucket)?,
            tables,
            wait: JobWaitPolicy {
                poll_interval: Duration::from_millis(self.warehouse.poll_interval_ms),
                timeout: Duration::from_secs(self.warehouse.job_timeout_secs),
            },
        })
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            warehouse: WarehouseConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            tables: default_tables(),
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (print the plan, don't call BigQuery or Cloud Storage)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// BigQuery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Project owning the dataset (and billed for the extract jobs)
    #[serde(default = "default_project")]
    pub project: String,

    /// Dataset holding the exported tables
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Location the extract jobs run in
    #[serde(default = "default_location")]
    pub location: String,

    /// Interval between job status checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on the wait for a single extract job
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

impl WarehouseConfig {
    fn validate(&self) -> Result<(), String> {
        ProjectId::new(&self.project).map_err(|e| format!("warehouse.project: {e}"))?;
        DatasetId::new(&self.dataset).map_err(|e| format!("warehouse.dataset: {e}"))?;

        if self.location.trim().is_empty() {
            return Err("warehouse.location cannot be empty".to_string());
        }

        if self.poll_interval_ms < 10 || self.poll_interval_ms > 60_000 {
            return Err(format!(
                "warehouse.poll_interval_ms must be between 10 and 60000, got {}",
                self.poll_interval_ms
            ));
        }
        if self.job_timeout_secs == 0 || self.job_timeout_secs > 86_400 {
            return Err(format!(
                "warehouse.job_timeout_secs must be between 1 and 86400, got {}",
                self.job_timeout_secs
            ));
        }
        if self.poll_interval_ms > self.job_timeout_secs * 1000 {
            return Err("warehouse.poll_interval_ms cannot exceed job_timeout_secs".to_string());
        }
        Ok(())
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            dataset: default_dataset(),
            location: default_location(),
            poll_interval_ms: default_poll_interval_ms(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

/// Cloud Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Destination bucket
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        BucketName::new(&self.bucket).map_err(|e| format!("storage.bucket: {e}"))?;
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
        }
    }
}

/// Credential configuration
///
/// With neither field set, Application Default Credentials are used:
/// `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud user credentials, then the
/// metadata server of the environment the function runs in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path to a service account or authorized user credentials file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,

    /// Inline credentials JSON, usually `${VAR}`-substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_json: Option<SecretString>,
}

impl AuthConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.credentials_path.is_some() && self.credentials_json.is_some() {
            return Err(
                "auth.credentials_path and auth.credentials_json are mutually exclusive"
                    .to_string(),
            );
        }
        if let Some(path) = &self.credentials_path {
            if path.trim().is_empty() {
                return Err("auth.credentials_path is set but empty".to_string());
            }
        }
        if let Some(json) = &self.credentials_json {
            if json.expose_secret().is_empty() {
                return Err("auth.credentials_json is set but empty".to_string());
            }
        }
        Ok(())
    }
}

/// HTTP trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (the `PORT` environment variable wins)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        Ok(())
    }

    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console output format: `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }

        if self.local_enabled {
            if self.local_path.is_empty() {
                return Err("Local logging enabled but local_path is empty".to_string());
            }

            let valid_rotations = ["daily", "hourly", "never"];
            if !valid_rotations.contains(&self.local_rotation.as_str()) {
                return Err(format!(
                    "Invalid local_rotation '{}'. Must be one of: {}",
                    self.local_rotation,
                    valid_rotations.join(", ")
                ));
            }
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// One `[[tables]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Source table in the configured dataset
    pub table: String,

    /// Object name in the destination bucket
    pub destination: String,
}

impl TableConfig {
    /// Creates a table entry
    pub fn new(table: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            destination: destination.into(),
        }
    }

    /// Validates the entry and derives its export record
    pub fn to_export(&self) -> Result<TableExport, String> {
        let table = TableId::new(&self.table).map_err(|e| format!("tables.table: {e}"))?;
        let destination = ObjectName::new(&self.destination)
            .map_err(|e| format!("tables.destination: {e}"))?;
        Ok(TableExport::new(table, destination))
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_job_timeout_secs() -> u64 {
    600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_local_path() -> String {
    "/var/log/machtry-export".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

/// The production table mapping
pub fn default_tables() -> Vec<TableConfig> {
    vec![
        TableConfig::new("task_duration_estimates", "task_duration_history.json"),
        TableConfig::new("calculated_machtry_quantiles", "machtry_quantiles.csv"),
    ]
}
