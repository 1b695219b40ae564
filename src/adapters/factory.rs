//! Service client factory
//!
//! Connects the BigQuery and Cloud Storage clients from configuration using
//! the same credentials for both.

use crate::adapters::auth::CredentialSource;
use crate::adapters::bigquery::BigQueryClient;
use crate::adapters::gcs::GcsClient;
use crate::adapters::traits::{BlobStore, Warehouse};
use crate::config::ExporterConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the warehouse and blob store clients
///
/// # Arguments
///
/// * `config` - The exporter configuration
///
/// # Returns
///
/// Returns Arc-wrapped trait objects for the warehouse and the blob store
///
/// # Errors
///
/// Returns `ExporterError::Authentication` if credentials cannot be loaded
/// or either client cannot be created
pub async fn create_clients(
    config: &ExporterConfig,
) -> Result<(Arc<dyn Warehouse>, Arc<dyn BlobStore>)> {
    tracing::info!(
        project = %config.warehouse.project,
        bucket = %config.storage.bucket,
        credentials = %CredentialSource::from_config(&config.auth),
        "Creating service clients"
    );

    let warehouse = BigQueryClient::connect(&config.auth).await?;
    let store = GcsClient::connect(&config.auth).await?;

    Ok((
        Arc::new(warehouse) as Arc<dyn Warehouse>,
        Arc::new(store) as Arc<dyn BlobStore>,
    ))
}
