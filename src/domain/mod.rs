//! Domain models and types for the exporter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProjectId`], [`DatasetId`], [`TableId`],
//!   [`BucketName`], [`ObjectName`])
//! - **Export records** ([`TableExport`], [`ExportFormat`])
//! - **Error types** ([`ExporterError`], [`WarehouseError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Names are validated once, when they enter the program:
//!
//! ```rust
//! use machtry_export::domain::{ExportFormat, TableExport};
//!
//! # fn example() -> Result<(), String> {
//! let export = TableExport::parse("calculated_machtry_quantiles", "machtry_quantiles.csv")?;
//! assert_eq!(export.format, ExportFormat::Csv);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod table_export;

// Re-export commonly used types for convenience
pub use errors::{ExporterError, StorageError, WarehouseError};
pub use ids::{BucketName, DatasetId, ObjectName, ProjectId, TableId};
pub use result::Result;
pub use table_export::{ExportFormat, TableExport};
