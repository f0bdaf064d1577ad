//! Catalog (reference table) entities.

pub mod brand;

pub use brand::{Brand, seed_brands};
