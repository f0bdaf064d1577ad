//! Store providers and the manager that dispatches to the configured one.

pub mod memory;
pub mod postgres;

mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use autocatalog_core::config::{DatabaseConfig, StoreKind};
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Mutation, MutationOutcome, StoreProvider};
use autocatalog_core::types::{Filter, QuerySpec, Record, TableSchema};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::connection;
use crate::migration::run_migrations;

/// Store manager that wraps the configured store provider.
///
/// The provider is selected at construction time based on configuration.
/// Cloning is cheap; every unit of work holds one.
#[derive(Debug, Clone)]
pub struct StoreManager {
    inner: Arc<dyn StoreProvider>,
}

impl StoreManager {
    /// Create a store manager from configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let inner: Arc<dyn StoreProvider> = match config.provider {
            StoreKind::Postgres => {
                info!("Initializing PostgreSQL store");
                let pool = connection::connect(config).await?;
                if config.run_migrations {
                    run_migrations(&pool).await?;
                }
                Arc::new(PostgresStore::new(pool))
            }
            StoreKind::Memory => {
                info!(seed = config.seed, "Initializing in-memory store");
                if config.seed {
                    Arc::new(MemoryStore::seeded().await?)
                } else {
                    Arc::new(MemoryStore::new())
                }
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn StoreProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl StoreProvider for StoreManager {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    async fn select(&self, table: &TableSchema, spec: &QuerySpec) -> AppResult<Vec<Record>> {
        self.inner.select(table, spec).await
    }

    async fn count(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        self.inner.count(table, filter).await
    }

    async fn delete_where(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        self.inner.delete_where(table, filter).await
    }

    async fn apply(&self, mutations: &[Mutation]) -> AppResult<Vec<MutationOutcome>> {
        self.inner.apply(mutations).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
