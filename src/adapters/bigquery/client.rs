//! BigQuery client

use crate::adapters::auth::{load_credentials, CredentialSource};
use crate::adapters::traits::{ExtractJobRequest, JobHandle, JobStatus, Warehouse};
use crate::config::AuthConfig;
use crate::domain::{ExportFormat, ExporterError, Result, WarehouseError};
use async_trait::async_trait;
use google_cloud_bigquery::client::{Client, ClientConfig};
use google_cloud_bigquery::http::job::get::GetJobRequest;
use google_cloud_bigquery::http::job::{
    Job, JobConfiguration, JobConfigurationExtract, JobConfigurationExtractSource,
    JobReference, JobState, JobType,
};
use google_cloud_bigquery::http::table::{DestinationFormat, TableReference};

/// Prefix of every job id submitted by the exporter
const JOB_ID_PREFIX: &str = "machtry_export";

/// BigQuery client submitting and polling extract jobs
pub struct BigQueryClient {
    client: Client,
}

impl BigQueryClient {
    /// Connects a client with the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Authentication` if no usable credentials are
    /// found or the client cannot be created
    pub async fn connect(auth: &AuthConfig) -> Result<Self> {
        let source = CredentialSource::from_config(auth);
        let (config, _project) = match load_credentials(auth).await? {
            Some(credentials) => ClientConfig::new_with_credentials(credentials).await,
            None => ClientConfig::new_with_auth().await,
        }
        .map_err(|e| {
            ExporterError::Authentication(format!("BigQuery credentials ({source}): {e}"))
        })?;

        let client = Client::new(config).await.map_err(|e| {
            ExporterError::Authentication(format!("Failed to create BigQuery client: {e}"))
        })?;

        tracing::debug!(credentials = %source, "BigQuery client ready");
        Ok(Self { client })
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn submit_extract_job(&self, request: &ExtractJobRequest) -> Result<JobHandle> {
        let job = extract_job(request, new_job_id(request.table.as_str()));

        tracing::debug!(
            table = %request.qualified_table(),
            job_id = %job.job_reference.job_id,
            destination = %request.destination_uri,
            format = %request.format,
            "Submitting extract job"
        );

        let created = self.client.job().create(&job).await.map_err(|e| {
            WarehouseError::SubmitFailed {
                table: request.qualified_table(),
                message: e.to_string(),
            }
        })?;

        Ok(JobHandle {
            project_id: created.job_reference.project_id,
            job_id: created.job_reference.job_id,
            location: created.job_reference.location,
        })
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus> {
        let request = GetJobRequest {
            location: job.location.clone(),
        };

        let current = self
            .client
            .job()
            .get(&job.project_id, &job.job_id, &request)
            .await
            .map_err(|e| WarehouseError::Request(format!("Failed to get job {job}: {e}")))?;

        Ok(job_status(&current))
    }
}

/// Builds the extract job writing `request`'s table to its destination URI
fn extract_job(request: &ExtractJobRequest, job_id: String) -> Job {
    let destination_format = match request.format {
        ExportFormat::Csv => DestinationFormat::Csv,
        ExportFormat::NewlineDelimitedJson => DestinationFormat::NewlineDelimitedJson,
    };

    Job {
        job_reference: JobReference {
            project_id: request.project.to_string(),
            job_id,
            location: Some(request.location.clone()),
        },
        configuration: JobConfiguration {
            job: JobType::Extract(JobConfigurationExtract {
                destination_uris: vec![request.destination_uri.clone()],
                destination_format: Some(destination_format),
                source: JobConfigurationExtractSource::SourceTable(TableReference {
                    project_id: request.project.to_string(),
                    dataset_id: request.dataset.to_string(),
                    table_id: request.table.to_string(),
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Maps a job resource to its state; a `DONE` job with an error result failed
fn job_status(job: &Job) -> JobStatus {
    match &job.status.state {
        JobState::Done => match &job.status.error_result {
            Some(error) => JobStatus::Failed {
                reason: error.reason.clone().unwrap_or_else(|| "unknown".to_string()),
                message: error.message.clone().unwrap_or_default(),
            },
            None => JobStatus::Succeeded,
        },
        JobState::Pending => JobStatus::Pending,
        _ => JobStatus::Running,
    }
}

/// Builds a unique job id: `machtry_export_<table>_<unix micros>`
///
/// Characters BigQuery does not allow in job ids are replaced with `_`.
fn new_job_id(table: &str) -> String {
    let sanitized: String = table
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}_{}_{}",
        JOB_ID_PREFIX,
        sanitized,
        chrono::Utc::now().timestamp_micros()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{DatasetId, ProjectId, TableId};
    use google_cloud_bigquery::http::types::ErrorProto;

    fn request(format: ExportFormat) -> ExtractJobRequest {
        ExtractJobRequest {
            project: ProjectId::new("proj").unwrap(),
            dataset: DatasetId::new("ds").unwrap(),
            table: TableId::new("calculated_machtry_quantiles").unwrap(),
            destination_uri: "gs://bucket/machtry_quantiles.csv.temp".to_string(),
            format,
            location: "US".to_string(),
        }
    }

    fn job_in(state: JobState) -> Job {
        let mut job = Job::default();
        job.status.state = state;
        job
    }

    #[test]
    fn test_extract_job_configuration() {
        let job = extract_job(&request(ExportFormat::Csv), "job_1".to_string());

        assert_eq!(job.job_reference.project_id, "proj");
        assert_eq!(job.job_reference.job_id, "job_1");
        assert_eq!(job.job_reference.location.as_deref(), Some("US"));

        let JobType::Extract(extract) = &job.configuration.job else {
            panic!("expected an extract job");
        };
        assert_eq!(
            extract.destination_uris,
            vec!["gs://bucket/machtry_quantiles.csv.temp".to_string()]
        );
        assert!(matches!(
            extract.destination_format,
            Some(DestinationFormat::Csv)
        ));
        match &extract.source {
            JobConfigurationExtractSource::SourceTable(table) => {
                assert_eq!(table.project_id, "proj");
                assert_eq!(table.dataset_id, "ds");
                assert_eq!(table.table_id, "calculated_machtry_quantiles");
            }
            _ => panic!("expected a source table"),
        }
    }

    #[test]
    fn test_extract_job_json_format() {
        let job = extract_job(
            &request(ExportFormat::NewlineDelimitedJson),
            "job_2".to_string(),
        );
        let JobType::Extract(extract) = &job.configuration.job else {
            panic!("expected an extract job");
        };
        assert!(matches!(
            extract.destination_format,
            Some(DestinationFormat::NewlineDelimitedJson)
        ));
    }

    #[test]
    fn test_job_status_mapping() {
        assert_eq!(job_status(&job_in(JobState::Pending)), JobStatus::Pending);
        assert_eq!(job_status(&job_in(JobState::Running)), JobStatus::Running);
        assert_eq!(job_status(&job_in(JobState::Done)), JobStatus::Succeeded);
    }

    #[test]
    fn test_done_with_error_result_is_failure() {
        let mut job = job_in(JobState::Done);
        job.status.error_result = Some(
            serde_json::from_value::<ErrorProto>(serde_json::json!({
                "reason": "notFound",
                "message": "Not found: Table proj:ds.calculated_machtry_quantiles"
            }))
            .unwrap(),
        );

        match job_status(&job) {
            JobStatus::Failed { reason, message } => {
                assert_eq!(reason, "notFound");
                assert!(message.contains("calculated_machtry_quantiles"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_job_id_sanitized() {
        let id = new_job_id("task.duration estimates");
        assert!(id.starts_with("machtry_export_task_duration_estimates_"));
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }
}
