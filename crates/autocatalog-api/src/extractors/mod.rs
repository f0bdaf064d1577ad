//! Custom Axum extractors.

pub mod path;
pub mod validated;

pub use validated::ValidatedJson;
