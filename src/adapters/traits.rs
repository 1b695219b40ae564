//! Service abstraction traits
//!
//! The export workflow only talks to BigQuery and Cloud Storage through these
//! traits, so the Google Cloud clients can be swapped for in-memory fakes in tests.

use crate::domain::ids::{BucketName, DatasetId, ObjectName, ProjectId, TableId};
use crate::domain::{ExportFormat, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Parameters of one extract job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractJobRequest {
    /// Project owning the source table; the job runs in this project
    pub project: ProjectId,

    /// Dataset of the source table
    pub dataset: DatasetId,

    /// Source table
    pub table: TableId,

    /// `gs://bucket/object` URI the job writes to
    pub destination_uri: String,

    /// Output format
    pub format: ExportFormat,

    /// Execution location; must match the dataset's location
    pub location: String,
}

impl ExtractJobRequest {
    /// Fully qualified `project.dataset.table` reference, for logs
    pub fn qualified_table(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Handle to a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobHandle {
    /// Project the job runs in
    pub project_id: String,

    /// Job identifier
    pub job_id: String,

    /// Location the job runs in
    pub location: Option<String>,
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}:{}.{}", self.project_id, location, self.job_id),
            None => write!(f, "{}:{}", self.project_id, self.job_id),
        }
    }
}

/// State of a submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, not started
    Pending,

    /// Running
    Running,

    /// Finished without an error result
    Succeeded,

    /// Finished with an error result
    Failed { reason: String, message: String },
}

/// Metadata of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Object name
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Base64 MD5 hash as reported by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,

    /// Object generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,

    /// Last modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// Data warehouse operations used by the exporter
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Submit an extract job
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the job (malformed table
    /// reference, location mismatch, permission denied).
    async fn submit_extract_job(&self, request: &ExtractJobRequest) -> Result<JobHandle>;

    /// Fetch the current state of a job
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be retrieved. A job that
    /// finished with an error is *not* an error here: it is reported as
    /// [`JobStatus::Failed`].
    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus>;
}

/// Blob store operations used by the exporter
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Look up a bucket by name
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist.
    async fn get_bucket(&self, bucket: &BucketName) -> Result<()>;

    /// Rename an object within a bucket
    ///
    /// After success `from` no longer exists and `to` holds its data,
    /// replacing any previous object of that name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectNotFound` if `from` does not exist.
    async fn rename_object(
        &self,
        bucket: &BucketName,
        from: &ObjectName,
        to: &ObjectName,
    ) -> Result<StoredObject>;

    /// Make an object readable by unauthenticated callers
    async fn make_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<()>;

    /// Fetch object metadata, `None` if the object does not exist
    async fn object_metadata(
        &self,
        bucket: &BucketName,
        object: &ObjectName,
    ) -> Result<Option<StoredObject>>;

    /// Whether an object is readable by unauthenticated callers
    async fn is_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<bool>;
}
