//! In-memory fakes for the warehouse and blob store traits
//!
//! The fake warehouse "runs" an extract job by rendering the table's rows in
//! the requested format and writing them to the fake store once the job is
//! polled to completion, so the whole workflow can be observed end to end.

#![allow(dead_code)]

use async_trait::async_trait;
use machtry_export::adapters::traits::{
    BlobStore, ExtractJobRequest, JobHandle, JobStatus, StoredObject, Warehouse,
};
use machtry_export::core::export::{ExportPlan, JobWaitPolicy};
use machtry_export::domain::ids::{BucketName, DatasetId, ObjectName, ProjectId};
use machtry_export::domain::{
    ExportFormat, ExporterError, Result, StorageError, TableExport, WarehouseError,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BUCKET: &str = "test-bucket";

/// Plan over the production table mapping with a fast job wait
pub fn plan() -> ExportPlan {
    ExportPlan {
        project: ProjectId::new("test-project").unwrap(),
        dataset: DatasetId::new("taskclusteretl").unwrap(),
        location: "US".to_string(),
        bucket: BucketName::new(BUCKET).unwrap(),
        tables: vec![
            TableExport::parse("task_duration_estimates", "task_duration_history.json").unwrap(),
            TableExport::parse("calculated_machtry_quantiles", "machtry_quantiles.csv").unwrap(),
        ],
        wait: JobWaitPolicy {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(200),
        },
    }
}

pub fn object(name: &str) -> ObjectName {
    ObjectName::new(name).unwrap()
}

#[derive(Debug, Clone)]
pub struct FakeObject {
    pub data: Vec<u8>,
    pub public: bool,
    pub generation: u64,
}

/// In-memory bucket
#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<BTreeMap<String, FakeObject>>,
    calls: Mutex<Vec<String>>,
    generation: AtomicU64,
    missing_bucket: bool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store whose bucket does not exist
    pub fn without_bucket() -> Arc<Self> {
        Arc::new(Self {
            missing_bucket: true,
            ..Self::default()
        })
    }

    pub fn put(&self, name: &str, data: &[u8], public: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.objects.lock().unwrap().insert(
            name.to_string(),
            FakeObject {
                data: data.to_vec(),
                public,
                generation,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<FakeObject> {
        self.objects.lock().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_bucket(&self, bucket: &BucketName) -> Result<()> {
        if self.missing_bucket || bucket.as_str() != BUCKET {
            return Err(StorageError::BucketNotFound(bucket.to_string()).into());
        }
        Ok(())
    }

    fn stored(name: &str, object: &FakeObject) -> StoredObject {
        StoredObject {
            name: name.to_string(),
            size: object.data.len() as u64,
            md5_hash: None,
            generation: Some(object.generation.to_string()),
            updated: None,
        }
    }
}

#[async_trait]
impl BlobStore for FakeStore {
    async fn get_bucket(&self, bucket: &BucketName) -> Result<()> {
        self.record(format!("get_bucket:{bucket}"));
        self.check_bucket(bucket)
    }

    async fn rename_object(
        &self,
        bucket: &BucketName,
        from: &ObjectName,
        to: &ObjectName,
    ) -> Result<StoredObject> {
        self.record(format!("rename:{from}->{to}"));
        self.check_bucket(bucket)?;

        let mut objects = self.objects.lock().unwrap();
        let source = objects
            .remove(from.as_str())
            .ok_or_else(|| ExporterError::from(StorageError::ObjectNotFound(from.to_string())))?;

        // A rename creates a new object: previous ACLs do not carry over.
        let renamed = FakeObject {
            data: source.data,
            public: false,
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        };
        let stored = Self::stored(to.as_str(), &renamed);
        objects.insert(to.to_string(), renamed);
        Ok(stored)
    }

    async fn make_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<()> {
        self.record(format!("make_public:{object}"));
        self.check_bucket(bucket)?;

        match self.objects.lock().unwrap().get_mut(object.as_str()) {
            Some(found) => {
                found.public = true;
                Ok(())
            }
            None => Err(StorageError::ObjectNotFound(object.to_string()).into()),
        }
    }

    async fn object_metadata(
        &self,
        bucket: &BucketName,
        object: &ObjectName,
    ) -> Result<Option<StoredObject>> {
        self.check_bucket(bucket)?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(object.as_str())
            .map(|o| Self::stored(object.as_str(), o)))
    }

    async fn is_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<bool> {
        self.check_bucket(bucket)?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(object.as_str())
            .is_some_and(|o| o.public))
    }
}

/// How a fake job for a table ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Writes the rendered rows and succeeds
    Succeed,
    /// Finishes with an error result, writing nothing
    Fail,
    /// Never leaves the RUNNING state
    Hang,
    /// Succeeds without writing anything
    SucceedWithoutOutput,
}

struct FakeJob {
    request: ExtractJobRequest,
    polls: usize,
}

/// In-memory warehouse writing into a [`FakeStore`]
pub struct FakeWarehouse {
    store: Arc<FakeStore>,
    rows: Mutex<HashMap<String, Vec<(String, u64)>>>,
    outcomes: HashMap<String, JobOutcome>,
    running_polls: usize,
    jobs: Mutex<HashMap<String, FakeJob>>,
    submitted: Mutex<Vec<ExtractJobRequest>>,
    rejected: HashSet<String>,
    next_id: AtomicU64,
}

impl FakeWarehouse {
    pub fn new(store: Arc<FakeStore>) -> Self {
        let mut rows = HashMap::new();
        rows.insert(
            "task_duration_estimates".to_string(),
            vec![
                ("test-linux/opt-mochitest-1".to_string(), 312),
                ("test-windows/debug-xpcshell-2".to_string(), 845),
            ],
        );
        rows.insert(
            "calculated_machtry_quantiles".to_string(),
            vec![("p50".to_string(), 1210), ("p90".to_string(), 3400)],
        );

        Self {
            store,
            rows: Mutex::new(rows),
            outcomes: HashMap::new(),
            running_polls: 2,
            jobs: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            rejected: HashSet::new(),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn with_outcome(mut self, table: &str, outcome: JobOutcome) -> Self {
        self.outcomes.insert(table.to_string(), outcome);
        self
    }

    /// Jobs for `table` are rejected at submission
    pub fn rejecting(mut self, table: &str) -> Self {
        self.rejected.insert(table.to_string());
        self
    }

    pub fn set_rows(&self, table: &str, rows: Vec<(String, u64)>) {
        self.rows.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn submitted(&self) -> Vec<ExtractJobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_tables(&self) -> Vec<String> {
        self.submitted()
            .iter()
            .map(|r| r.table.to_string())
            .collect()
    }

    fn render(&self, request: &ExtractJobRequest) -> Vec<u8> {
        let rows = self.rows.lock().unwrap();
        let rows = rows
            .get(request.table.as_str())
            .cloned()
            .unwrap_or_default();

        let text: String = match request.format {
            ExportFormat::Csv => std::iter::once("name,value\n".to_string())
                .chain(rows.iter().map(|(n, v)| format!("{n},{v}\n")))
                .collect(),
            ExportFormat::NewlineDelimitedJson => rows
                .iter()
                .map(|(n, v)| format!("{{\"name\":\"{n}\",\"value\":{v}}}\n"))
                .collect(),
        };
        text.into_bytes()
    }

    fn object_name(uri: &str) -> String {
        let prefix = format!("gs://{BUCKET}/");
        uri.strip_prefix(&prefix).unwrap_or(uri).to_string()
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn submit_extract_job(&self, request: &ExtractJobRequest) -> Result<JobHandle> {
        self.submitted.lock().unwrap().push(request.clone());

        if self.rejected.contains(request.table.as_str()) {
            return Err(WarehouseError::SubmitFailed {
                table: request.qualified_table(),
                message: "Not found: Table".to_string(),
            }
            .into());
        }

        let job_id = format!("job_{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.jobs.lock().unwrap().insert(
            job_id.clone(),
            FakeJob {
                request: request.clone(),
                polls: 0,
            },
        );

        Ok(JobHandle {
            project_id: request.project.to_string(),
            job_id,
            location: Some(request.location.clone()),
        })
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus> {
        let mut jobs = self.jobs.lock().unwrap();
        let fake = jobs.get_mut(&job.job_id).ok_or_else(|| {
            ExporterError::from(WarehouseError::Request("no such job".to_string()))
        })?;

        fake.polls += 1;
        let outcome = self
            .outcomes
            .get(fake.request.table.as_str())
            .copied()
            .unwrap_or(JobOutcome::Succeed);

        if fake.polls == 1 {
            return Ok(JobStatus::Pending);
        }
        if outcome == JobOutcome::Hang || fake.polls <= self.running_polls {
            return Ok(JobStatus::Running);
        }

        match outcome {
            JobOutcome::Fail => Ok(JobStatus::Failed {
                reason: "invalid".to_string(),
                message: format!("Failed to export {}", fake.request.table),
            }),
            JobOutcome::SucceedWithoutOutput => Ok(JobStatus::Succeeded),
            _ => {
                let data = self.render(&fake.request);
                let name = Self::object_name(&fake.request.destination_uri);
                self.store.put(&name, &data, false);
                Ok(JobStatus::Succeeded)
            }
        }
    }
}
