//! Molt CLI library.
//!
//! This library provides the core functionality for the `molt` command-line interface,
//! including configuration management, archive ingestion, interrupt handling,
//! command execution, and output formatting.

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
