//! Molt CLI - retire posts older than a retention window.

use clap::Parser;
use molt_cli::cli::RunArgs;
use molt_cli::commands::{self, run::{exit_code, shows_final_status}};
use molt_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> molt_cli::Result<i32> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load or create config
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let mut config = Config::load_or_init(&config_path)?;
    config.apply_env();

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    let code = match cli.command {
        Some(Command::Run(args)) => {
            let report = commands::execute_run(args, &config, &formatter).await?;
            exit_code(&report)
        }
        Some(Command::Status) => {
            commands::execute_status(&config, &formatter)?;
            0
        }
        Some(Command::Ingest(args)) => {
            commands::execute_ingest(args, &config, &formatter)?;
            0
        }
        None => {
            // Status before and after a single run
            commands::execute_status(&config, &formatter)?;
            let report = commands::execute_run(RunArgs::default(), &config, &formatter).await?;
            if shows_final_status(&report) {
                commands::execute_status(&config, &formatter)?;
            }
            exit_code(&report)
        }
    };

    Ok(code)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
