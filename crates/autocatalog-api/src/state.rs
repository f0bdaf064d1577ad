//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use autocatalog_core::config::AppConfig;
use autocatalog_database::{StoreManager, UnitOfWork};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Store manager (PostgreSQL or in-memory)
    pub store: StoreManager,
}

impl AppState {
    pub fn new(config: AppConfig, store: StoreManager) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// A fresh unit of work for one request.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::begin(&self.store)
    }
}
