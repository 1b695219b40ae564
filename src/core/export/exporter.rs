//! Single-table export
//!
//! One table goes through four steps, strictly in order:
//!
//! 1. extract the table into `<destination>.temp`
//! 2. wait for the extract job to finish
//! 3. rename the temporary object to its destination
//! 4. make the destination public
//!
//! Readers of the destination therefore only ever see a complete previous
//! export or a complete new one. A failure at any step is returned as-is and
//! leaves the destination untouched; a temporary object left behind by a
//! failed rename is overwritten by the next run.

use crate::adapters::traits::{BlobStore, ExtractJobRequest, JobHandle, JobStatus, Warehouse};
use crate::core::export::plan::ExportPlan;
use crate::core::export::summary::TableExportResult;
use crate::domain::{Result, TableExport, WarehouseError};
use crate::{log_export_complete, log_export_start};
use std::sync::Arc;
use tokio::time::Instant;

/// Exports one table at a time
pub struct TableExporter {
    warehouse: Arc<dyn Warehouse>,
    store: Arc<dyn BlobStore>,
    plan: Arc<ExportPlan>,
}

impl TableExporter {
    /// Create a new table exporter
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        store: Arc<dyn BlobStore>,
        plan: Arc<ExportPlan>,
    ) -> Self {
        Self {
            warehouse,
            store,
            plan,
        }
    }

    /// Export one table to its destination object
    ///
    /// # Errors
    ///
    /// Returns the first failure of the submit, wait, rename or publish step.
    /// A job still running after the configured timeout fails with
    /// [`WarehouseError::JobTimeout`]; a job finishing with an error result
    /// fails with [`WarehouseError::JobFailed`].
    pub async fn export_table(&self, export: &TableExport) -> Result<TableExportResult> {
        let started = Instant::now();
        let temporary = export.temporary_destination();
        log_export_start!(export.table, export.destination);

        let request = ExtractJobRequest {
            project: self.plan.project.clone(),
            dataset: self.plan.dataset.clone(),
            table: export.table.clone(),
            destination_uri: self.plan.temporary_uri(export),
            format: export.format,
            location: self.plan.location.clone(),
        };

        let job = self.warehouse.submit_extract_job(&request).await?;
        tracing::info!(
            table = %export.table,
            job_id = %job.job_id,
            destination = %request.destination_uri,
            format = %export.format,
            "Extract job submitted"
        );

        self.wait_for_job(&job).await?;
        tracing::info!(job_id = %job.job_id, "Extract job finished");

        self.store.get_bucket(&self.plan.bucket).await?;

        let object = self
            .store
            .rename_object(&self.plan.bucket, &temporary, &export.destination)
            .await?;
        tracing::debug!(
            from = %temporary,
            to = %export.destination,
            generation = object.generation.as_deref().unwrap_or(""),
            "Temporary object renamed"
        );

        self.store
            .make_public(&self.plan.bucket, &export.destination)
            .await?;

        let elapsed = started.elapsed();
        log_export_complete!(export.destination, object.size, elapsed);

        Ok(TableExportResult {
            table: export.table.to_string(),
            destination: export.destination.to_string(),
            uri: self.plan.destination_uri(export),
            format: export.format,
            job_id: job.job_id,
            object,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Poll the job until it is terminal or the wait times out
    async fn wait_for_job(&self, job: &JobHandle) -> Result<()> {
        let policy = self.plan.wait;
        let started = Instant::now();

        loop {
            match self.warehouse.job_status(job).await? {
                JobStatus::Succeeded => return Ok(()),
                JobStatus::Failed { reason, message } => {
                    return Err(WarehouseError::JobFailed {
                        job_id: job.job_id.clone(),
                        reason,
                        message,
                    }
                    .into());
                }
                JobStatus::Pending | JobStatus::Running => {}
            }

            let waited = started.elapsed();
            if waited >= policy.timeout {
                return Err(WarehouseError::JobTimeout {
                    job_id: job.job_id.clone(),
                    waited,
                }
                .into());
            }

            let remaining = policy.timeout - waited;
            tracing::trace!(
                job_id = %job.job_id,
                waited_ms = waited.as_millis() as u64,
                "Job still running"
            );
            tokio::time::sleep(policy.poll_interval.min(remaining)).await;
        }
    }
}
