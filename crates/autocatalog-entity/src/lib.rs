//! # autocatalog-entity
//!
//! Domain entity models for AutoCatalog. Every persisted struct embeds
//! [`ModelBase`] and implements [`autocatalog_core::traits::Entity`], which
//! gives the generic repository and handlers static access to the table
//! schema and the identity key.

pub mod base;
pub mod catalog;
pub mod record;

pub use base::ModelBase;
pub use catalog::Brand;
