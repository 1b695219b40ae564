//! Export orchestrator - runs the configured table exports in order

use crate::adapters::traits::{BlobStore, Warehouse};
use crate::core::export::exporter::TableExporter;
use crate::core::export::plan::ExportPlan;
use crate::core::export::summary::ExportSummary;
use crate::domain::{ExporterError, Result};
use crate::log_error_with_context;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Export orchestrator
///
/// Tables are exported one after the other, in configuration order. The
/// first failure aborts the run: later tables are not attempted and earlier
/// ones keep their freshly published data.
pub struct ExportOrchestrator {
    plan: Arc<ExportPlan>,
    exporter: TableExporter,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ExportOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `plan` - What to export
    /// * `warehouse` - Client submitting extract jobs
    /// * `store` - Client managing the exported objects
    pub fn new(
        plan: ExportPlan,
        warehouse: Arc<dyn Warehouse>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        let plan = Arc::new(plan);
        Self {
            exporter: TableExporter::new(warehouse, store, Arc::clone(&plan)),
            plan,
            shutdown: None,
        }
    }

    /// Stop before the next table once `shutdown` turns true
    ///
    /// A table whose export already started is always finished.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// The plan this orchestrator executes
    pub fn plan(&self) -> &ExportPlan {
        &self.plan
    }

    /// Execute the export
    ///
    /// # Errors
    ///
    /// Returns the error of the first table that fails, or
    /// [`ExporterError::Interrupted`] if a shutdown was requested between
    /// two tables.
    pub async fn run(&self) -> Result<ExportSummary> {
        let started = Instant::now();
        let mut summary = ExportSummary::new(self.plan.bucket.as_str());

        tracing::info!(
            project = %self.plan.project,
            dataset = %self.plan.dataset,
            bucket = %self.plan.bucket,
            tables = self.plan.tables.len(),
            "Starting export run"
        );

        for export in &self.plan.tables {
            if self.shutdown_requested() {
                tracing::warn!(table = %export.table, "Shutdown requested, stopping export run");
                return Err(ExporterError::Interrupted(format!(
                    "stopped before exporting {}",
                    export.table
                )));
            }

            let result = match self.exporter.export_table(export).await {
                Ok(result) => result,
                Err(e) => {
                    let context = format!("Export of {export} failed");
                    log_error_with_context!(&e, context.as_str());
                    return Err(e);
                }
            };
            summary.add_table(result);
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
