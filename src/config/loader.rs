//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ExporterConfig;
use super::secret::secret_string;
use crate::domain::errors::ExporterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Configuration file looked up when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "machtry-export.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExporterConfig
/// 4. Applies environment variable overrides (MACHTRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is missing, the TOML is malformed or validation fails.
///
/// # Examples
///
/// ```no_run
/// use machtry_export::config::loader::load_config;
///
/// let config = load_config("machtry-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExporterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExporterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Loads the configuration the way the binary does
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is used
/// if present, and the built-in production configuration otherwise. Both
/// paths go through environment overrides and validation.
pub fn load_config_or_default(path: Option<&str>) -> Result<ExporterConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => {
            tracing::debug!("No configuration file found, using built-in configuration");
            finish(ExporterConfig::default())
        }
    }
}

/// Parses configuration from TOML text
pub fn parse_config(contents: &str) -> Result<ExporterConfig> {
    let contents = substitute_env_vars(contents)?;

    let config: ExporterConfig = toml::from_str(&contents)
        .map_err(|e| ExporterError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(config)
}

fn finish(mut config: ExporterConfig) -> Result<ExporterConfig> {
    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ExporterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment variable pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExporterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(variable = name, value = %value, "Ignoring unparsable override");
            None
        }
    }
}

/// Applies environment variable overrides using the MACHTRY_* prefix
///
/// Environment variables follow the pattern `MACHTRY_<SECTION>_<KEY>`, for
/// example `MACHTRY_STORAGE_BUCKET`. `PORT`, set by Cloud Run and Cloud
/// Functions, overrides the server port and takes precedence over
/// `MACHTRY_SERVER_PORT`.
fn apply_env_overrides(config: &mut ExporterConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("MACHTRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("MACHTRY_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // Warehouse overrides
    if let Ok(val) = std::env::var("MACHTRY_WAREHOUSE_PROJECT") {
        config.warehouse.project = val;
    }
    if let Ok(val) = std::env::var("MACHTRY_WAREHOUSE_DATASET") {
        config.warehouse.dataset = val;
    }
    if let Ok(val) = std::env::var("MACHTRY_WAREHOUSE_LOCATION") {
        config.warehouse.location = val;
    }
    if let Some(val) = env_parsed("MACHTRY_WAREHOUSE_POLL_INTERVAL_MS") {
        config.warehouse.poll_interval_ms = val;
    }
    if let Some(val) = env_parsed("MACHTRY_WAREHOUSE_JOB_TIMEOUT_SECS") {
        config.warehouse.job_timeout_secs = val;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("MACHTRY_STORAGE_BUCKET") {
        config.storage.bucket = val;
    }

    // Auth overrides
    if let Ok(val) = std::env::var("MACHTRY_AUTH_CREDENTIALS_PATH") {
        config.auth.credentials_path = Some(val);
    }
    if let Ok(val) = std::env::var("MACHTRY_AUTH_CREDENTIALS_JSON") {
        config.auth.credentials_json = Some(secret_string(val));
    }

    // Server overrides
    if let Ok(val) = std::env::var("MACHTRY_SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(val) = env_parsed("MACHTRY_SERVER_PORT") {
        config.server.port = val;
    }
    if let Some(val) = env_parsed("PORT") {
        config.server.port = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MACHTRY_LOGGING_FORMAT") {
        config.logging.format = val;
    }
    if let Some(val) = env_parsed("MACHTRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("MACHTRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
