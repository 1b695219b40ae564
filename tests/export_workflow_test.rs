//! Integration tests for the export workflow
//!
//! Runs the orchestrator against the in-memory warehouse and store from
//! `common` and checks what ends up in the bucket.

mod common;

use common::{plan, FakeStore, FakeWarehouse, JobOutcome, BUCKET};
use machtry_export::adapters::traits::{BlobStore, Warehouse};
use machtry_export::cli::commands::status::collect_status;
use machtry_export::core::export::{ExportOrchestrator, TableExporter};
use machtry_export::domain::{ExportFormat, ExporterError, StorageError, WarehouseError};
use std::sync::Arc;
use tokio::sync::watch;

fn orchestrator(warehouse: Arc<FakeWarehouse>, store: Arc<FakeStore>) -> ExportOrchestrator {
    ExportOrchestrator::new(
        plan(),
        warehouse as Arc<dyn Warehouse>,
        store as Arc<dyn BlobStore>,
    )
}

#[tokio::test]
async fn test_formats_follow_destination_suffix() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));

    let summary = orchestrator(warehouse.clone(), store.clone())
        .run()
        .await
        .unwrap();

    let submitted = warehouse.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].table.as_str(), "task_duration_estimates");
    assert_eq!(submitted[0].format, ExportFormat::NewlineDelimitedJson);
    assert_eq!(
        submitted[0].destination_uri,
        format!("gs://{BUCKET}/task_duration_history.json.temp")
    );
    assert_eq!(submitted[1].table.as_str(), "calculated_machtry_quantiles");
    assert_eq!(submitted[1].format, ExportFormat::Csv);
    assert_eq!(
        submitted[1].destination_uri,
        format!("gs://{BUCKET}/machtry_quantiles.csv.temp")
    );
    assert!(submitted.iter().all(|r| r.location == "US"));

    assert_eq!(summary.tables[0].format, ExportFormat::NewlineDelimitedJson);
    assert_eq!(summary.tables[1].format, ExportFormat::Csv);

    let csv = store.get("machtry_quantiles.csv").unwrap();
    assert!(String::from_utf8(csv.data).unwrap().starts_with("name,value\n"));
    let json = store.get("task_duration_history.json").unwrap();
    assert!(String::from_utf8(json.data).unwrap().starts_with("{\"name\":"));
}

#[tokio::test]
async fn test_successful_run_leaves_no_temporary_objects() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));

    orchestrator(warehouse, store.clone()).run().await.unwrap();

    assert_eq!(
        store.names(),
        vec![
            "machtry_quantiles.csv".to_string(),
            "task_duration_history.json".to_string()
        ]
    );
    assert!(store.names().iter().all(|n| !n.ends_with(".temp")));
}

#[tokio::test]
async fn test_successful_run_publishes_every_destination() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));

    let summary = orchestrator(warehouse, store.clone()).run().await.unwrap();

    for destination in ["task_duration_history.json", "machtry_quantiles.csv"] {
        assert!(store.get(destination).unwrap().public, "{destination} not public");
    }
    assert_eq!(summary.tables.len(), 2);
    assert_eq!(summary.bucket, BUCKET);
    assert_eq!(
        summary.tables[1].uri,
        format!("gs://{BUCKET}/machtry_quantiles.csv")
    );
    assert_eq!(summary.total_bytes(), {
        let a = store.get("task_duration_history.json").unwrap().data.len();
        let b = store.get("machtry_quantiles.csv").unwrap().data.len();
        (a + b) as u64
    });
}

#[tokio::test]
async fn test_steps_run_in_order_per_table() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));

    orchestrator(warehouse, store.clone()).run().await.unwrap();

    assert_eq!(
        store.calls(),
        vec![
            format!("get_bucket:{BUCKET}"),
            "rename:task_duration_history.json.temp->task_duration_history.json".to_string(),
            "make_public:task_duration_history.json".to_string(),
            format!("get_bucket:{BUCKET}"),
            "rename:machtry_quantiles.csv.temp->machtry_quantiles.csv".to_string(),
            "make_public:machtry_quantiles.csv".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));
    let orchestrator = orchestrator(warehouse, store.clone());

    orchestrator.run().await.unwrap();
    let first_json = store.get("task_duration_history.json").unwrap();
    let first_csv = store.get("machtry_quantiles.csv").unwrap();

    orchestrator.run().await.unwrap();
    let second_json = store.get("task_duration_history.json").unwrap();
    let second_csv = store.get("machtry_quantiles.csv").unwrap();

    assert_eq!(first_json.data, second_json.data);
    assert_eq!(first_csv.data, second_csv.data);
    // Same bytes, but freshly written objects.
    assert_ne!(first_json.generation, second_json.generation);
    assert!(second_json.public && second_csv.public);
}

#[tokio::test]
async fn test_new_data_replaces_previous_export() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));
    let orchestrator = orchestrator(warehouse.clone(), store.clone());

    orchestrator.run().await.unwrap();
    warehouse.set_rows("calculated_machtry_quantiles", vec![("p99".to_string(), 9000)]);
    orchestrator.run().await.unwrap();

    let csv = String::from_utf8(store.get("machtry_quantiles.csv").unwrap().data).unwrap();
    assert_eq!(csv, "name,value\np99,9000\n");
}

#[tokio::test]
async fn test_failed_job_leaves_destination_untouched() {
    let store = FakeStore::new();
    store.put("task_duration_history.json", b"previous export", true);
    let warehouse = Arc::new(
        FakeWarehouse::new(store.clone()).with_outcome("task_duration_estimates", JobOutcome::Fail),
    );

    let err = orchestrator(warehouse.clone(), store.clone())
        .run()
        .await
        .unwrap_err();

    match err {
        ExporterError::Warehouse(WarehouseError::JobFailed { reason, message, .. }) => {
            assert_eq!(reason, "invalid");
            assert!(message.contains("task_duration_estimates"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let kept = store.get("task_duration_history.json").unwrap();
    assert_eq!(kept.data, b"previous export");
    assert!(kept.public);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_first_failure_stops_the_run() {
    let store = FakeStore::new();
    let warehouse = Arc::new(
        FakeWarehouse::new(store.clone()).with_outcome("task_duration_estimates", JobOutcome::Fail),
    );

    assert!(orchestrator(warehouse.clone(), store.clone())
        .run()
        .await
        .is_err());

    assert_eq!(warehouse.submitted_tables(), vec!["task_duration_estimates"]);
    assert!(store.get("machtry_quantiles.csv").is_none());
}

#[tokio::test]
async fn test_second_failure_keeps_first_export() {
    let store = FakeStore::new();
    let warehouse = Arc::new(
        FakeWarehouse::new(store.clone())
            .with_outcome("calculated_machtry_quantiles", JobOutcome::Fail),
    );

    assert!(orchestrator(warehouse, store.clone()).run().await.is_err());

    let published = store.get("task_duration_history.json").unwrap();
    assert!(published.public);
    assert!(store.get("machtry_quantiles.csv").is_none());
}

#[tokio::test]
async fn test_job_timeout_is_not_a_job_failure() {
    let store = FakeStore::new();
    store.put("task_duration_history.json", b"previous export", true);
    let warehouse = Arc::new(
        FakeWarehouse::new(store.clone()).with_outcome("task_duration_estimates", JobOutcome::Hang),
    );

    let err = orchestrator(warehouse.clone(), store.clone())
        .run()
        .await
        .unwrap_err();

    match &err {
        ExporterError::Warehouse(e) => {
            assert!(e.is_timeout(), "expected timeout, got {e:?}");
            assert!(matches!(e, WarehouseError::JobTimeout { job_id, .. } if job_id == "job_0"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(
        store.get("task_duration_history.json").unwrap().data,
        b"previous export"
    );
    assert_eq!(warehouse.submitted_tables().len(), 1);
}

#[tokio::test]
async fn test_rejected_submission_is_reported() {
    let store = FakeStore::new();
    let warehouse =
        Arc::new(FakeWarehouse::new(store.clone()).rejecting("task_duration_estimates"));

    let err = orchestrator(warehouse, store.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExporterError::Warehouse(WarehouseError::SubmitFailed { .. })
    ));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_missing_temporary_object_fails_rename() {
    let store = FakeStore::new();
    store.put("task_duration_history.json", b"previous export", true);
    let warehouse = Arc::new(
        FakeWarehouse::new(store.clone())
            .with_outcome("task_duration_estimates", JobOutcome::SucceedWithoutOutput),
    );

    let err = orchestrator(warehouse, store.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExporterError::Storage(StorageError::ObjectNotFound(ref name))
            if name == "task_duration_history.json.temp"
    ));
    assert_eq!(
        store.get("task_duration_history.json").unwrap().data,
        b"previous export"
    );
}

#[tokio::test]
async fn test_missing_bucket_fails_before_rename() {
    let store = FakeStore::without_bucket();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));

    let err = orchestrator(warehouse, store.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExporterError::Storage(StorageError::BucketNotFound(_))
    ));
    assert_eq!(store.calls(), vec![format!("get_bucket:{BUCKET}")]);
}

#[tokio::test]
async fn test_shutdown_before_start_exports_nothing() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let err = orchestrator(warehouse.clone(), store)
        .with_shutdown(rx)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ExporterError::Interrupted(_)));
    assert_eq!(err.exit_code(), 130);
    assert!(warehouse.submitted().is_empty());
}

#[tokio::test]
async fn test_table_exporter_single_table() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));
    let plan = Arc::new(plan());
    let exporter = TableExporter::new(warehouse, store.clone(), Arc::clone(&plan));

    let result = exporter.export_table(&plan.tables[1]).await.unwrap();

    assert_eq!(result.table, "calculated_machtry_quantiles");
    assert_eq!(result.destination, "machtry_quantiles.csv");
    assert_eq!(result.job_id, "job_0");
    assert_eq!(result.object.name, "machtry_quantiles.csv");
    assert_eq!(
        result.object.size,
        store.get("machtry_quantiles.csv").unwrap().data.len() as u64
    );
    assert!(store.get("task_duration_history.json").is_none());
}

#[tokio::test]
async fn test_status_reports_published_objects() {
    let store = FakeStore::new();
    let warehouse = Arc::new(FakeWarehouse::new(store.clone()));
    let plan = plan();

    let before = collect_status(&*store, &plan, false).await.unwrap();
    assert!(before.iter().all(|s| s.size.is_none() && !s.public));

    orchestrator(warehouse, store.clone()).run().await.unwrap();
    store.put("machtry_quantiles.csv.temp", b"leftover", false);

    let after = collect_status(&*store, &plan, true).await.unwrap();
    let names: Vec<&str> = after.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "task_duration_history.json",
            "task_duration_history.json.temp",
            "machtry_quantiles.csv",
            "machtry_quantiles.csv.temp",
        ]
    );
    assert!(after[0].public && after[2].public);
    assert!(after[1].size.is_none());
    assert_eq!(after[3].size, Some(8));
    assert!(!after[3].public);
}
