//! # autocatalog-core
//!
//! Core crate for AutoCatalog. Contains the unified error system,
//! configuration schemas, dynamic value/filter/sort/pagination types,
//! table schemas, and the `Entity` and `StoreProvider` traits.
//!
//! This crate has **no** internal dependencies on other AutoCatalog crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
