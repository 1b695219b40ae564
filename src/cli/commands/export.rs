//! Export command implementation
//!
//! This module implements the `export` command, a single run over the
//! configured tables.

use crate::adapters::create_clients;
use crate::config::load_config_or_default;
use crate::core::export::{ExportOrchestrator, ExportPlan, ExportSummary};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dry run mode - print the plan without calling BigQuery or Cloud Storage
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to these configured tables (comma-separated)
    #[arg(long)]
    pub table: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let mut plan = match config.export_plan() {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        if let Some(tables) = &self.table {
            let names: Vec<String> = tables
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::info!(tables = ?names, "Restricting export to tables from CLI");

            plan = match plan.select_tables(&names) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Invalid --table: {e}");
                    return Ok(2);
                }
            };
        }

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - no job will be submitted");
            print_plan(&plan);
            return Ok(0);
        }

        let (warehouse, store) = match create_clients(&config).await {
            Ok(clients) => clients,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create service clients");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        let orchestrator =
            ExportOrchestrator::new(plan, warehouse, store).with_shutdown(shutdown_signal);

        println!("🚀 Starting export...");
        println!();

        match orchestrator.run().await {
            Ok(summary) => {
                print_summary(&summary);
                println!("✅ Export completed successfully!");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("❌ Export failed: {e}");
                Ok(e.exit_code())
            }
        }
    }
}

fn print_plan(plan: &ExportPlan) {
    println!("🔍 DRY RUN MODE - nothing will be exported");
    println!();
    println!("Export Plan:");
    println!("  Source: {}.{}", plan.project, plan.dataset);
    println!("  Location: {}", plan.location);
    println!("  Bucket: {}", plan.bucket);
    println!(
        "  Job timeout: {}s (poll every {}ms)",
        plan.wait.timeout.as_secs(),
        plan.wait.poll_interval.as_millis()
    );
    println!();
    for (i, export) in plan.tables.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, export.table, export.format);
        println!("     extract to: {}", plan.temporary_uri(export));
        println!("     publish as: {}", plan.destination_uri(export));
    }
    println!();
}

fn print_summary(summary: &ExportSummary) {
    println!("📊 Export Summary:");
    println!("  Bucket: {}", summary.bucket);
    for table in &summary.tables {
        println!(
            "  {} -> {} ({}, {} bytes, {:.2}s)",
            table.table,
            table.uri,
            table.format,
            table.object.size,
            table.duration_ms as f64 / 1000.0
        );
    }
    println!("  Duration: {:.2}s", summary.duration_ms as f64 / 1000.0);
    println!();
}
