//! Storage backend trait.
//!
//! Stores work on type-erased [`Record`]s so that a single trait object can
//! serve every entity type. Reads and `delete_where` act immediately;
//! staged inserts, updates, and deletes reach the store only through
//! [`StoreProvider::apply`], which must be atomic.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::filter::Filter;
use crate::types::query::QuerySpec;
use crate::types::schema::{Record, TableSchema};

/// The change a mutation makes.
#[derive(Debug, Clone)]
pub enum MutationKind {
    /// Insert a row. A key of `0` (or no key) lets the store assign one.
    Insert(Record),
    /// Replace every value column of the row identified by the record's key.
    Update(Record),
    /// Delete the row with this key.
    Delete(i32),
}

/// One staged change against one table.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// Target table.
    pub table: TableSchema,
    /// The change.
    pub kind: MutationKind,
}

/// Result of applying one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Rows touched.
    pub rows_affected: u64,
    /// Key of the inserted row, for inserts.
    pub key: Option<i32>,
}

/// A storage backend.
#[async_trait]
pub trait StoreProvider: Send + Sync + Debug + 'static {
    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;

    /// Select rows.
    async fn select(&self, table: &TableSchema, spec: &QuerySpec) -> AppResult<Vec<Record>>;

    /// Count rows matching a filter.
    async fn count(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64>;

    /// Delete every row matching a filter, immediately.
    async fn delete_where(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64>;

    /// Apply a batch of mutations atomically.
    ///
    /// An update or delete that matches no row fails the whole batch with
    /// a conflict error and nothing is persisted.
    async fn apply(&self, mutations: &[Mutation]) -> AppResult<Vec<MutationOutcome>>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
