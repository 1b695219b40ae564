//! Export orchestration
//!
//! This module provides the core export logic:
//! - [`ExportPlan`] - the validated, ordered list of table records
//! - [`TableExporter`] - extract, wait, rename and publish for one table
//! - [`ExportOrchestrator`] - sequential run over the whole plan
//! - [`ExportSummary`] - what was published

pub mod exporter;
pub mod orchestrator;
pub mod plan;
pub mod summary;

pub use exporter::TableExporter;
pub use orchestrator::ExportOrchestrator;
pub use plan::{ExportPlan, JobWaitPolicy};
pub use summary::{ExportSummary, TableExportResult};
