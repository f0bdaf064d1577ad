//! Typed accessors for decoding records into entities.

use chrono::{DateTime, Utc};

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::types::{FieldValue, Record};

/// Remove-and-convert helpers over [`Record`].
pub trait RecordExt {
    /// Take an integer column.
    fn take_int(&mut self, column: &str) -> AppResult<i32>;
    /// Take a text column.
    fn take_text(&mut self, column: &str) -> AppResult<String>;
    /// Take a timestamp column.
    fn take_timestamp(&mut self, column: &str) -> AppResult<DateTime<Utc>>;
}

impl RecordExt for Record {
    fn take_int(&mut self, column: &str) -> AppResult<i32> {
        match self.remove(column) {
            Some(FieldValue::Int(v)) => Ok(v),
            Some(FieldValue::BigInt(v)) => i32::try_from(v)
                .map_err(|_| AppError::internal(format!("Column '{column}' out of range: {v}"))),
            other => Err(unexpected(column, "integer", other)),
        }
    }

    fn take_text(&mut self, column: &str) -> AppResult<String> {
        match self.remove(column) {
            Some(FieldValue::Text(v)) => Ok(v),
            other => Err(unexpected(column, "text", other)),
        }
    }

    fn take_timestamp(&mut self, column: &str) -> AppResult<DateTime<Utc>> {
        match self.remove(column) {
            Some(FieldValue::Timestamp(v)) => Ok(v),
            other => Err(unexpected(column, "timestamp", other)),
        }
    }
}

fn unexpected(column: &str, expected: &str, found: Option<FieldValue>) -> AppError {
    match found {
        Some(value) => AppError::internal(format!(
            "Column '{column}' expected {expected}, found {value:?}"
        )),
        None => AppError::internal(format!("Column '{column}' missing from row")),
    }
}
