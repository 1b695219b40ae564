//! Serve command implementation
//!
//! Runs the HTTP trigger used by Cloud Functions / Cloud Run. Every request
//! to `/` performs one export run.

use crate::adapters::create_clients;
use crate::config::load_config_or_default;
use crate::core::export::ExportOrchestrator;
use crate::server;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Override the port to bind
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let plan = match config.export_plan() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };

        let (warehouse, store) = match create_clients(&config).await {
            Ok(clients) => clients,
            Err(e) => {
                eprintln!("Failed to initialize service clients: {e}");
                return Ok(4);
            }
        };

        let listener = match server::bind(&config.server).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start HTTP trigger");
                eprintln!("{e}");
                return Ok(5);
            }
        };

        let orchestrator = Arc::new(ExportOrchestrator::new(plan, warehouse, store));
        server::serve(listener, orchestrator, shutdown_signal).await?;

        tracing::info!("HTTP trigger stopped");
        Ok(0)
    }
}
