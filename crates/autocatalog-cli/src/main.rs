//! AutoCatalog CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use autocatalog_core::error::ErrorKind;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "autocatalog=debug,warn"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            // Bad input and bad configuration exit with 2, everything else with 1.
            match e.kind {
                ErrorKind::Validation | ErrorKind::Configuration => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
