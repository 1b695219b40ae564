//! Domain identifier types with validation
//!
//! Newtype wrappers for the BigQuery and Cloud Storage names the exporter
//! passes around. Each type validates on construction so a malformed name is
//! rejected when the configuration is loaded, not halfway through a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix appended to a destination name to form the extract job's target
pub const TEMPORARY_SUFFIX: &str = ".temp";

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Google Cloud project identifier
///
/// # Examples
///
/// ```
/// use machtry_export::domain::ids::ProjectId;
///
/// let project = ProjectId::new("moz-fx-data-taskclu-prod-8fbf").unwrap();
/// assert_eq!(project.as_str(), "moz-fx-data-taskclu-prod-8fbf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new ProjectId, rejecting empty names and names containing
    /// whitespace or `/`
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Project ID cannot be empty".to_string());
        }
        if id.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(format!("Invalid project ID '{id}'"));
        }
        Ok(Self(id))
    }
}

string_id!(ProjectId);

/// BigQuery dataset identifier
///
/// Datasets may only contain letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetId(String);

impl DatasetId {
    /// Creates a new DatasetId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Dataset ID cannot be empty".to_string());
        }
        if id.len() > 1024 {
            return Err(format!("Dataset ID '{id}' exceeds 1024 characters"));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Invalid dataset ID '{id}'. Only letters, digits and underscores are allowed"
            ));
        }
        Ok(Self(id))
    }
}

string_id!(DatasetId);

/// BigQuery table identifier (without project or dataset qualification)
///
/// # Examples
///
/// ```
/// use machtry_export::domain::ids::TableId;
///
/// assert!(TableId::new("task_duration_estimates").is_ok());
/// assert!(TableId::new("taskclusteretl.task_duration_estimates").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId(String);

impl TableId {
    /// Creates a new TableId
    ///
    /// Qualified references (`dataset.table`, `project:dataset.table`) are
    /// rejected: project and dataset come from configuration.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Table ID cannot be empty".to_string());
        }
        if id.len() > 1024 {
            return Err(format!("Table ID '{id}' exceeds 1024 characters"));
        }
        if id.contains(['.', ':', '/', '`']) {
            return Err(format!(
                "Table ID '{id}' must be unqualified (no '.', ':', '/' or '`')"
            ));
        }
        Ok(Self(id))
    }
}

string_id!(TableId);

/// Cloud Storage bucket name
///
/// Follows the bucket naming rules: 3-63 characters (222 with dots), lowercase
/// letters, digits, `-`, `_` and `.`, starting and ending with a letter or
/// digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Creates a new BucketName
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let max_len = if name.contains('.') { 222 } else { 63 };
        if name.len() < 3 || name.len() > max_len {
            return Err(format!(
                "Bucket name '{name}' must be between 3 and {max_len} characters"
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "-_.".contains(c))
        {
            return Err(format!(
                "Invalid bucket name '{name}'. Only lowercase letters, digits, '-', '_' and '.' are allowed"
            ));
        }
        let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        if !name.starts_with(alnum) || !name.ends_with(alnum) {
            return Err(format!(
                "Bucket name '{name}' must start and end with a letter or digit"
            ));
        }
        Ok(Self(name))
    }
}

string_id!(BucketName);

/// Cloud Storage object name
///
/// # Examples
///
/// ```
/// use machtry_export::domain::ids::ObjectName;
///
/// let name = ObjectName::new("machtry_quantiles.csv").unwrap();
/// assert_eq!(name.temporary().as_str(), "machtry_quantiles.csv.temp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    /// Creates a new ObjectName
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Object name cannot be empty".to_string());
        }
        if name.len() > 1024 {
            return Err(format!("Object name '{name}' exceeds 1024 bytes"));
        }
        if name.contains(['\r', '\n']) {
            return Err("Object name cannot contain carriage returns or line feeds".to_string());
        }
        if name == "." || name == ".." {
            return Err(format!("Object name '{name}' is reserved"));
        }
        Ok(Self(name))
    }

    /// Name of the buffer object an extract job writes to before promotion
    pub fn temporary(&self) -> ObjectName {
        ObjectName(format!("{}{}", self.0, TEMPORARY_SUFFIX))
    }

    /// Whether this name carries the temporary suffix
    pub fn is_temporary(&self) -> bool {
        self.0.ends_with(TEMPORARY_SUFFIX)
    }

    /// The `gs://` URI of this object inside `bucket`
    pub fn gs_uri(&self, bucket: &BucketName) -> String {
        format!("gs://{}/{}", bucket, self.0)
    }
}

string_id!(ObjectName);
