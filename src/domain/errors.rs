//! Domain error types
//!
//! This module defines the error hierarchy for the exporter. All errors are
//! domain-specific and don't expose third-party types: client library and
//! parser failures are converted into messages at the adapter boundary.

use std::time::Duration;
use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the application. None of
/// these errors are caught or retried by the export workflow: they propagate
/// to the invoking trigger, which decides what to do with a failed run.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configuration-related errors (bad identifiers, unreadable config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failed to obtain an access token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// BigQuery-related errors
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Cloud Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The run was stopped by a shutdown signal between two tables
    #[error("Export interrupted: {0}")]
    Interrupted(String),

    /// HTTP trigger errors
    #[error("Server error: {0}")]
    Server(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Warehouse (BigQuery) errors
///
/// Covers both submission failures and failures reported by the job itself
/// once it reaches a terminal state.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The extract job could not be submitted (bad table reference,
    /// location mismatch, permission denied, ...)
    #[error("Failed to submit extract job for {table}: {message}")]
    SubmitFailed { table: String, message: String },

    /// The job reached the DONE state with an error result
    #[error("Extract job {job_id} failed: {message} (reason: {reason})")]
    JobFailed {
        job_id: String,
        reason: String,
        message: String,
    },

    /// The job did not reach a terminal state before the wait timed out
    #[error("Extract job {job_id} still running after {waited:?}")]
    JobTimeout { job_id: String, waited: Duration },

    /// Transport-level failure
    #[error("BigQuery request failed: {0}")]
    Request(String),
}

/// Blob store (Cloud Storage) errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bucket does not exist or is not visible to the caller
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist (e.g. the temporary export never materialized)
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Access denied by IAM or bucket policy
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Precondition or name conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rename (rewrite + delete) failed
    #[error("Failed to rename {from} to {to}: {message}")]
    RenameFailed {
        from: String,
        to: String,
        message: String,
    },

    /// Making the object public failed
    #[error("Failed to make {object} public: {message}")]
    AclFailed { object: String, message: String },

    /// The service answered with something we could not interpret
    #[error("Invalid response from Cloud Storage: {0}")]
    InvalidResponse(String),

    /// Transport-level failure
    #[error("Cloud Storage request failed: {0}")]
    Request(String),
}

impl WarehouseError {
    /// Whether the error was produced by the job wait timing out rather than
    /// by the job failing
    pub fn is_timeout(&self) -> bool {
        matches!(self, WarehouseError::JobTimeout { .. })
    }
}

impl ExporterError {
    /// Exit code reported by the CLI for this error
    ///
    /// 2 for configuration problems, 4 for credential problems, 130 for an
    /// interrupted run and 5 for everything else that happened while exporting.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExporterError::Configuration(_) | ExporterError::Validation(_) => 2,
            ExporterError::Authentication(_) => 4,
            ExporterError::Interrupted(_) => 130,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExporterError {
    fn from(err: toml::de::Error) -> Self {
        ExporterError::Configuration(format!("TOML parse error: {err}"))
    }
}
