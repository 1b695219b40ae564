//! Core business logic.
//!
//! # Export Workflow
//!
//! For every configured table, in order:
//!
//! 1. **Extract**: submit a BigQuery extract job writing `<destination>.temp`
//! 2. **Wait**: poll the job until it is done, bounded by a timeout
//! 3. **Rename**: move the temporary object onto the destination name
//! 4. **Publish**: grant `allUsers` read access to the destination
//!
//! # Example
//!
//! ```rust,no_run
//! use machtry_export::adapters::create_clients;
//! use machtry_export::config::load_config_or_default;
//! use machtry_export::core::export::ExportOrchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default(None)?;
//! let plan = config.export_plan()?;
//! let (warehouse, store) = create_clients(&config).await?;
//!
//! let orchestrator = ExportOrchestrator::new(plan, warehouse, store);
//! let summary = orchestrator.run().await?;
//!
//! println!("Published {} objects", summary.tables.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
