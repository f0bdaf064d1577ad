//! CLI command definitions and dispatch.

pub mod brands;
pub mod config;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::debug;

use autocatalog_core::config::AppConfig;
use autocatalog_core::error::AppError;
use autocatalog_database::StoreManager;

use crate::output::OutputFormat;

/// AutoCatalog: car brand catalog service
#[derive(Debug, Parser)]
#[command(name = "autocatalog", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "AUTOCATALOG_CONFIG", default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "AUTOCATALOG_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log catalog and store activity at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the AutoCatalog server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Brand catalog management
    Brands(brands::BrandArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self.load_config()?).await,
            Commands::Migrate(args) => migrate::execute(args, self.load_config()?).await,
            Commands::Brands(args) => brands::execute(args, self.load_config()?, self.format).await,
            Commands::Config(args) => config::execute(args, self.load_config(), &self.config, self.format),
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        debug!(path = %self.config, env = %self.env, "Loading configuration");
        AppConfig::load(&self.config, &self.env)
    }
}

/// Helper: connect to the configured store
pub async fn connect_store(config: &AppConfig) -> Result<StoreManager, AppError> {
    StoreManager::connect(&config.database).await
}
