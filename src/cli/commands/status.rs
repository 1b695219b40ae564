//! Status command implementation
//!
//! This module implements the `status` command, which shows the published
//! object behind every configured destination and whether it is public.

use crate::adapters::create_clients;
use crate::adapters::traits::BlobStore;
use crate::config::load_config_or_default;
use crate::core::export::ExportPlan;
use crate::domain::Result;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also report lingering `.temp` objects
    #[arg(long)]
    pub temporary: bool,
}

/// State of one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationStatus {
    /// Object name
    pub name: String,

    /// Size in bytes, `None` if the object does not exist
    pub size: Option<u64>,

    /// Last update, formatted
    pub updated: Option<String>,

    /// Readable by `allUsers`
    pub public: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Checking published objects");

        println!("📊 Export Status");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let plan = match config.export_plan() {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let (_, store) = match create_clients(&config).await {
            Ok(clients) => clients,
            Err(e) => {
                println!("❌ Failed to initialize Cloud Storage client");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let statuses = match collect_status(store.as_ref(), &plan, self.temporary).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to read object status");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("Bucket: gs://{}", plan.bucket);
        println!();
        println!(
            "{:<40} {:<14} {:<25} {:<8}",
            "Object", "Size", "Updated", "Public"
        );
        println!("{}", "-".repeat(90));

        for status in &statuses {
            let size = status
                .size
                .map(|s| s.to_string())
                .unwrap_or_else(|| "missing".to_string());
            let updated = status.updated.as_deref().unwrap_or("-");
            let public = if status.size.is_none() {
                "-"
            } else if status.public {
                "✅ yes"
            } else {
                "❌ no"
            };
            println!(
                "{:<40} {:<14} {:<25} {:<8}",
                status.name, size, updated, public
            );
        }
        println!();

        Ok(0)
    }
}

/// Look up every destination of `plan` (and optionally its temporary object)
///
/// # Errors
///
/// Returns an error if the store cannot be queried
pub async fn collect_status(
    store: &dyn BlobStore,
    plan: &ExportPlan,
    include_temporary: bool,
) -> Result<Vec<DestinationStatus>> {
    let mut statuses = Vec::new();

    for export in &plan.tables {
        let mut names = vec![export.destination.clone()];
        if include_temporary {
            names.push(export.temporary_destination());
        }

        for name in names {
            let status = match store.object_metadata(&plan.bucket, &name).await? {
                Some(object) => DestinationStatus {
                    name: name.to_string(),
                    size: Some(object.size),
                    updated: object
                        .updated
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                    public: store.is_public(&plan.bucket, &name).await?,
                },
                None => DestinationStatus {
                    name: name.to_string(),
                    size: None,
                    updated: None,
                    public: false,
                },
            };
            statuses.push(status);
        }
    }

    Ok(statuses)
}
