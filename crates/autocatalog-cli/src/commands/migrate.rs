//! Database migration commands.

use clap::{Args, Subcommand};

use autocatalog_core::config::{AppConfig, StoreKind};
use autocatalog_core::error::AppError;
use autocatalog_database::connection;
use autocatalog_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: AppConfig) -> Result<(), AppError> {
    match args.command {
        MigrateCommand::Run => {
            if config.database.provider != StoreKind::Postgres {
                output::warning("The in-memory store has no schema to migrate");
                return Ok(());
            }

            let pool = connection::connect(&config.database).await?;
            let result = run_migrations(&pool).await;
            pool.close().await;
            result?;
            output::success("Catalog schema is up to date");
        }
    }

    Ok(())
}
