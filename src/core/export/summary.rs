//! Export summary and reporting
//!
//! The summary is printed by the CLI and returned as the JSON body of the
//! HTTP trigger.

use crate::adapters::traits::StoredObject;
use crate::domain::ExportFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Outcome of one successful table export
#[derive(Debug, Clone, Serialize)]
pub struct TableExportResult {
    /// Source table
    pub table: String,

    /// Published object name
    pub destination: String,

    /// `gs://` URI of the published object
    pub uri: String,

    /// Export format
    pub format: ExportFormat,

    /// Extract job id
    pub job_id: String,

    /// Metadata of the published object as reported after the rename
    pub object: StoredObject,

    /// Wall time of the whole table export
    pub duration_ms: u64,
}

/// Summary of an export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Destination bucket
    pub bucket: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Exported tables, in order
    pub tables: Vec<TableExportResult>,

    /// Wall time of the run
    pub duration_ms: u64,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            started_at: Utc::now(),
            tables: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record a finished table
    pub fn add_table(&mut self, result: TableExportResult) {
        self.tables.push(result);
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Total size of the published objects
    pub fn total_bytes(&self) -> u64 {
        self.tables.iter().map(|t| t.object.size).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            bucket = %self.bucket,
            tables = self.tables.len(),
            total_bytes = self.total_bytes(),
            duration_ms = self.duration_ms,
            "Export run completed"
        );

        for table in &self.tables {
            tracing::info!(
                table = %table.table,
                uri = %table.uri,
                format = %table.format,
                job_id = %table.job_id,
                bytes = table.object.size,
                md5_hash = table.object.md5_hash.as_deref().unwrap_or(""),
                generation = table.object.generation.as_deref().unwrap_or(""),
                duration_ms = table.duration_ms,
                "Published object"
            );
        }
    }
}
