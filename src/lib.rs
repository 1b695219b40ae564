//! # machtry-export - BigQuery to Cloud Storage publisher
//!
//! machtry-export publishes the Mach Try scheduling data: it exports BigQuery
//! tables to Cloud Storage and makes the resulting objects publicly readable
//! under stable names. It runs as an HTTP-triggered cloud function or as a
//! one-shot CLI.
//!
//! ## Overview
//!
//! For every configured `(table, destination)` record, in order:
//! - **Extracting** the table with a BigQuery extract job into
//!   `<destination>.temp`, as CSV for `.csv` destinations and
//!   newline-delimited JSON otherwise
//! - **Waiting** for the job, bounded by a configurable timeout
//! - **Renaming** the temporary object onto the destination
//! - **Publishing** the destination to `allUsers`
//!
//! The first failure aborts the run.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export plan, table exporter and orchestrator
//! - [`adapters`] - BigQuery, Cloud Storage and credential clients
//! - [`domain`] - Identifiers, table records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`server`] - HTTP trigger
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use machtry_export::adapters::create_clients;
//! use machtry_export::config::load_config_or_default;
//! use machtry_export::core::export::ExportOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default(None)?;
//!     let (warehouse, store) = create_clients(&config).await?;
//!
//!     let orchestrator = ExportOrchestrator::new(config.export_plan()?, warehouse, store);
//!     let summary = orchestrator.run().await?;
//!
//!     println!("Published {} bytes", summary.total_bytes());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library operations return [`domain::ExporterError`]. Service failures
//! are nested as [`domain::WarehouseError`] and [`domain::StorageError`], so
//! a job that timed out can be told apart from one that failed:
//!
//! ```rust
//! use machtry_export::domain::ExporterError;
//!
//! fn is_timeout(err: &ExporterError) -> bool {
//!     matches!(err, ExporterError::Warehouse(e) if e.is_timeout())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
