//! Shared shape of every persisted record.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use autocatalog_core::result::AppResult;
use autocatalog_core::types::{Column, ColumnKind, FieldValue, Record};

use crate::record::RecordExt;

/// Identity key and creation timestamp shared by all entities.
///
/// Serialized inline (flattened) into each entity's JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelBase {
    /// Surrogate key assigned by the store on insert; `0` until persisted.
    #[serde(rename = "id", alias = "Id")]
    pub id: i32,
    /// When the in-memory object was constructed.
    #[serde(rename = "fIngreso", alias = "FIngreso")]
    pub created_at: DateTime<Utc>,
}

impl ModelBase {
    /// Key column.
    pub const KEY_COLUMN: &'static str = "Id";
    /// Creation timestamp column.
    pub const CREATED_AT_COLUMN: &'static str = "FIngreso";

    /// The base columns, for inclusion in an entity's schema.
    pub const COLUMNS: [Column; 2] = [
        Column::required(Self::KEY_COLUMN, ColumnKind::Int),
        Column::required(Self::CREATED_AT_COLUMN, ColumnKind::Timestamp),
    ];

    /// A base with an explicit key and timestamp.
    pub fn with_id(id: i32, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }

    /// Write the base columns into a record.
    pub fn write_record(&self, record: &mut Record) {
        record.insert(Self::KEY_COLUMN, FieldValue::Int(self.id));
        record.insert(
            Self::CREATED_AT_COLUMN,
            FieldValue::Timestamp(self.created_at),
        );
    }

    /// Read the base columns out of a record.
    pub fn read_record(record: &mut Record) -> AppResult<Self> {
        Ok(Self {
            id: record.take_int(Self::KEY_COLUMN)?,
            created_at: record.take_timestamp(Self::CREATED_AT_COLUMN)?,
        })
    }
}

// Microsecond precision matches `timestamptz`, so a value reads back unchanged.
impl Default for ModelBase {
    fn default() -> Self {
        Self {
            id: 0,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
