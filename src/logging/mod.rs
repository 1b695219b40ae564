//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Text or JSON console output
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use machtry_export::logging::init_logging;
//! use machtry_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "task_duration_estimates", "Export started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a table export
///
/// # Example
///
/// ```no_run
/// use machtry_export::log_export_start;
///
/// log_export_start!("task_duration_estimates", "task_duration_history.json");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($table:expr, $destination:expr) => {
        tracing::info!(
            table = %$table,
            destination = %$destination,
            "Starting table export"
        );
    };
}

/// Log the completion of a table export
///
/// # Example
///
/// ```no_run
/// use machtry_export::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("machtry_quantiles.csv", 52413u64, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($destination:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            destination = %$destination,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "Table export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use machtry_export::log_error_with_context;
/// use machtry_export::domain::ExporterError;
///
/// let error = ExporterError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
