//! The static capability every persisted record type implements.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;
use crate::types::schema::{Record, TableSchema};

/// A record type mapped to one table with an integer identity key.
///
/// The key accessor is declared here so that generic code (ordering by
/// key, matching a path id against a body id) never has to look fields up
/// by name at runtime.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Human-readable entity name used in messages and logs.
    const NAME: &'static str;

    /// Table description.
    const TABLE: TableSchema;

    /// The identity key. `0` means "not yet persisted".
    fn key(&self) -> i32;

    /// Overwrite the identity key.
    fn set_key(&mut self, key: i32);

    /// Convert to a column map.
    fn to_record(&self) -> Record;

    /// Rebuild from a column map produced by a store.
    fn from_record(record: Record) -> AppResult<Self>;

    /// Whether the store has not assigned a key yet.
    fn is_transient(&self) -> bool {
        self.key() == 0
    }
}
