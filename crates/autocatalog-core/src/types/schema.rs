//! Static table descriptions.
//!
//! Every entity declares its table, key column, and typed columns at
//! compile time; stores use the schema to render SQL, decode rows, and
//! order by the key without any runtime type inspection.

use std::collections::BTreeMap;

use super::value::FieldValue;

/// A row as a column-name → value map.
pub type Record = BTreeMap<&'static str, FieldValue>;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `integer`
    Int,
    /// `bigint`
    BigInt,
    /// `text`
    Text,
    /// `timestamp with time zone`
    Timestamp,
    /// `boolean`
    Bool,
}

/// A column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name as stored.
    pub name: &'static str,
    /// Storage type.
    pub kind: ColumnKind,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
}

impl Column {
    /// A non-null column.
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }
}

/// A table with an integer identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub name: &'static str,
    /// Identity key column (`integer`, assigned by the store on insert).
    pub key: &'static str,
    /// All columns, key included.
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns other than the key.
    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.name != self.key)
    }

    /// Read the key out of a record.
    pub fn key_of(&self, record: &Record) -> Option<i32> {
        record
            .get(self.key)
            .and_then(FieldValue::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }
}
