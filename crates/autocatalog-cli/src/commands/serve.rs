//! Start the AutoCatalog server.

use clap::Args;

use autocatalog_core::config::AppConfig;
use autocatalog_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Serve from the seeded in-memory store instead of the configured one
    #[arg(long)]
    pub in_memory: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.in_memory {
        config.database = AppConfig::in_memory().database;
    }

    println!("Starting AutoCatalog server...");
    println!("  Host:  {}", config.server.host);
    println!("  Port:  {}", config.server.port);
    println!("  Store: {}", config.database.provider);

    autocatalog_api::run_server(config).await
}
