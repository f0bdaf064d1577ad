//! # autocatalog-api
//!
//! HTTP API layer for AutoCatalog built on Axum.
//!
//! Provides the generic CRUD endpoints, the brand catalog alias, health,
//! middleware (CORS, logging), and extractors.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use handlers::crud::RestResource;
pub use state::AppState;
