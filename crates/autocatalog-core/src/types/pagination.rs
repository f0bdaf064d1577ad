//! Pagination window for paged listings.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A 1-based page window: `skip = page_size * (page - 1)`, `take = page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a page request, rejecting non-positive values.
    pub fn new(page: i64, page_size: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if page_size < 1 {
            return Err(AppError::validation(format!(
                "pageSize must be at least 1, got {page_size}"
            )));
        }
        Ok(Self {
            page: page as u64,
            page_size: page_size as u64,
        })
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}
