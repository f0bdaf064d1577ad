//! # autocatalog-database
//!
//! Data-access layer for AutoCatalog: PostgreSQL connection management and
//! migrations, the store providers (PostgreSQL and in-memory), and the
//! generic [`Repository`] / [`UnitOfWork`] pair that stages changes and
//! commits them together.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod repository;
pub mod store;
pub mod unit_of_work;

mod session;

pub use repositories::BrandRepository;
pub use repository::{Query, Repository, Tracked};
pub use store::{MemoryStore, PostgresStore, StoreManager};
pub use unit_of_work::UnitOfWork;
