//! External system integrations.
//!
//! This module provides adapters for the Google Cloud services the exporter
//! talks to:
//!
//! - [`bigquery`] - BigQuery extract jobs
//! - [`gcs`] - Cloud Storage objects and ACLs
//! - [`auth`] - Service account key or Application Default Credentials
//! - [`traits`] - Service abstraction traits used by the export workflow
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The export workflow only sees the
//! [`traits::Warehouse`] and [`traits::BlobStore`] traits.
//!
//! ```rust,no_run
//! use machtry_export::adapters::create_clients;
//! use machtry_export::config::ExporterConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (warehouse, store) = create_clients(&ExporterConfig::default()).await?;
//! // Hand both to an ExportOrchestrator
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod bigquery;
pub mod factory;
pub mod gcs;
pub mod traits;

pub use factory::create_clients;
pub use traits::{BlobStore, ExtractJobRequest, JobHandle, JobStatus, StoredObject, Warehouse};
