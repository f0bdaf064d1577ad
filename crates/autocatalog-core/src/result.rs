//! Convenience result type alias for AutoCatalog.

use crate::error::AppError;

/// A specialized `Result` type for AutoCatalog operations.
pub type AppResult<T> = Result<T, AppError>;
