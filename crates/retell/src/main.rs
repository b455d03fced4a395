//! Retell CLI binary.
//!
//! This binary provides command-line access to Retell's functionality:
//! - Run the full retelling pipeline
//! - Validate an existing text against the blocklist
//! - Print the effective blocklist

use clap::Parser;
use retell::observability::{ObservabilityConfig, init_observability_with_config};
use retell::{RetellConfig, RetellResult};
use std::process::ExitCode;

mod cli;

use cli::{Cli, Commands, print_blocklist, run_pipeline, validate_prose};

async fn execute(cli: Cli) -> RetellResult<()> {
    let config = RetellConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run_pipeline(&args, &config).await,
        Commands::Validate(args) => validate_prose(&args, &config),
        Commands::Blocklist(args) => print_blocklist(&args, &config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before configuration so RETELL_* and GEMINI_API_KEY are visible
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let observability = ObservabilityConfig::new("retell")
        .with_log_level(log_level)
        .with_json_logs(cli.json_logs);
    if let Err(e) = init_observability_with_config(observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, stage = ?e.stage(), "Retell failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
