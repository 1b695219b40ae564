//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// machtry-export - publish the Mach Try BigQuery tables to Cloud Storage
#[derive(Parser, Debug)]
#[command(name = "machtry-export")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to machtry-export.toml if present,
    /// otherwise the built-in production configuration)
    #[arg(short, long, env = "MACHTRY_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MACHTRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the configured tables once
    Export(commands::export::ExportArgs),

    /// Serve the HTTP trigger
    Serve(commands::serve::ServeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the published objects
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
