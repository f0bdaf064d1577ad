//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an absent file yields a
//! runnable configuration.

pub mod app;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseConfig, StoreKind};
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (base file + environment overlay + `AUTOCATALOG__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config_path` with an environment-specific overlay
    /// (`config/{env}`) and environment variables prefixed with
    /// `AUTOCATALOG__`, e.g. `AUTOCATALOG__DATABASE__URL`.
    pub fn load(config_path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AUTOCATALOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Configuration backed by the in-memory store, used by tests and demos.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig {
                provider: StoreKind::Memory,
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = AppConfig::load("config/does-not-exist", "nowhere").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.provider, StoreKind::Postgres);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_in_memory() {
        let config = AppConfig::in_memory();
        assert_eq!(config.database.provider, StoreKind::Memory);
        assert!(config.database.seed);
    }
}
