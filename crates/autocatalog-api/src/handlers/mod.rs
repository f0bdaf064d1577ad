//! HTTP request handlers.

pub mod brand;
pub mod crud;
pub mod health;
