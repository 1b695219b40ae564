//! Table export records
//!
//! A [`TableExport`] pairs a warehouse table with the object it is published
//! as. The export format is derived from the destination name when the record
//! is built, so a record can never carry a format that disagrees with its
//! file name.

use super::ids::{ObjectName, TableId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format of an extract job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    Csv,
    /// One JSON object per line
    NewlineDelimitedJson,
}

impl ExportFormat {
    /// Derives the format from a destination name
    ///
    /// Names ending in `.csv` are exported as CSV, everything else as
    /// newline-delimited JSON. The match is case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use machtry_export::domain::{ExportFormat, ObjectName};
    ///
    /// let csv = ObjectName::new("machtry_quantiles.csv").unwrap();
    /// assert_eq!(ExportFormat::for_destination(&csv), ExportFormat::Csv);
    ///
    /// let json = ObjectName::new("task_duration_history.json").unwrap();
    /// assert_eq!(
    ///     ExportFormat::for_destination(&json),
    ///     ExportFormat::NewlineDelimitedJson
    /// );
    /// ```
    pub fn for_destination(destination: &ObjectName) -> Self {
        if destination.as_str().ends_with(".csv") {
            ExportFormat::Csv
        } else {
            ExportFormat::NewlineDelimitedJson
        }
    }

    /// The `destinationFormat` value understood by BigQuery
    pub fn as_bigquery_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_bigquery_str())
    }
}

/// One table-to-object mapping of the export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableExport {
    /// Source table, unqualified
    pub table: TableId,

    /// Final object name in the destination bucket
    pub destination: ObjectName,

    /// Format derived from `destination`
    pub format: ExportFormat,
}

impl TableExport {
    /// Creates a record, deriving the format from the destination name
    pub fn new(table: TableId, destination: ObjectName) -> Self {
        let format = ExportFormat::for_destination(&destination);
        Self {
            table,
            destination,
            format,
        }
    }

    /// Creates a record from raw names, validating both
    pub fn parse(table: &str, destination: &str) -> Result<Self, String> {
        Ok(Self::new(TableId::new(table)?, ObjectName::new(destination)?))
    }

    /// The object the extract job writes to
    pub fn temporary_destination(&self) -> ObjectName {
        self.destination.temporary()
    }
}

impl fmt::Display for TableExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.table, self.destination, self.format)
    }
}
