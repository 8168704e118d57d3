//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Molt - retire your old posts after a retention window.
#[derive(Debug, Parser)]
#[command(name = "molt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MOLT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete every post older than the retention window
    Run(RunArgs),

    /// Show how many posts are in each state
    Status,

    /// Load posts from archive files into the database
    Ingest(IngestArgs),
}

/// Arguments for the run command.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Minimum post age in days (overrides the config file)
    #[arg(short, long)]
    pub retention_days: Option<u64>,

    /// Number of concurrent deletes (overrides the config file)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// List eligible posts without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Archive files (.js, .json or a zipped export) or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
