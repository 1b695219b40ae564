//! Typed export plan
//!
//! The plan is what a run actually executes: validated identifiers, the
//! ordered table records and the job wait policy. It is built once from
//! [`ExporterConfig`](crate::config::ExporterConfig) and never changes
//! afterwards.

use crate::domain::ids::{BucketName, DatasetId, ProjectId};
use crate::domain::TableExport;
use serde::Serialize;
use std::time::Duration;

/// How long and how often to wait for an extract job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobWaitPolicy {
    /// Delay between two status checks
    pub poll_interval: Duration,

    /// Upper bound on the whole wait
    pub timeout: Duration,
}

impl Default for JobWaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Everything one export run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPlan {
    /// Project owning the dataset; extract jobs run here
    pub project: ProjectId,

    /// Dataset holding the tables
    pub dataset: DatasetId,

    /// Job execution location
    pub location: String,

    /// Destination bucket
    pub bucket: BucketName,

    /// Records to export, in order
    pub tables: Vec<TableExport>,

    /// Job wait policy
    pub wait: JobWaitPolicy,
}

impl ExportPlan {
    /// Restricts the plan to the named tables, keeping configuration order
    ///
    /// # Errors
    ///
    /// Returns an error if `names` is empty or names a table that is not
    /// configured
    pub fn select_tables(mut self, names: &[String]) -> Result<Self, String> {
        if names.is_empty() {
            return Err("No tables selected".to_string());
        }

        if let Some(unknown) = names
            .iter()
            .find(|name| !self.tables.iter().any(|t| t.table.as_str() == name.as_str()))
        {
            return Err(format!("Table '{unknown}' is not configured"));
        }

        self.tables
            .retain(|t| names.iter().any(|name| name.as_str() == t.table.as_str()));
        Ok(self)
    }

    /// `gs://` URI the extract job for `export` writes to
    pub fn temporary_uri(&self, export: &TableExport) -> String {
        export.temporary_destination().gs_uri(&self.bucket)
    }

    /// `gs://` URI of the published object for `export`
    pub fn destination_uri(&self, export: &TableExport) -> String {
        export.destination.gs_uri(&self.bucket)
    }
}
