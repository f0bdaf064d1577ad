//! Core type definitions used across the AutoCatalog workspace.

pub mod filter;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod sorting;
pub mod value;

pub use filter::{Filter, FilterField, FilterOp};
pub use pagination::PageRequest;
pub use query::QuerySpec;
pub use schema::{Column, ColumnKind, Record, TableSchema};
pub use sorting::{SortDirection, SortField};
pub use value::FieldValue;
