//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use autocatalog_core::config::AppConfig;
use autocatalog_core::error::AppError;
use autocatalog_database::connection::mask_password;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (database password masked)
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    loaded: Result<AppConfig, AppError>,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match args.command {
        ConfigCommand::Show => {
            let mut config = loaded?;
            config.database.url = mask_password(&config.database.url);
            output::document(&config, format);
        }
        ConfigCommand::Validate => match loaded {
            Ok(config) => {
                output::success(&format!("Configuration '{config_path}' is valid"));
                output::field("Server", &config.server.bind_addr());
                output::field("Store", &config.database.provider.to_string());
                output::field("Database", &mask_password(&config.database.url));
                output::field("Logging", &format!("{} ({})", config.logging.level, config.logging.format));
            }
            Err(e) => {
                return Err(AppError::configuration(format!(
                    "Configuration '{config_path}' is invalid: {e}"
                )));
            }
        },
    }

    Ok(())
}
