//! Core traits defined in `autocatalog-core` and implemented by other crates.

pub mod entity;
pub mod store;

pub use entity::Entity;
pub use store::{Mutation, MutationKind, MutationOutcome, StoreProvider};
