//! SQL rendering for the PostgreSQL store.
//!
//! Identifiers come from static table schemas and are always quoted;
//! values are always bound. Filter and sort columns are checked against
//! the schema before anything is rendered.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::types::{
    ColumnKind, FieldValue, Filter, QuerySpec, Record, TableSchema,
};

/// A query builder that owns its bound arguments.
pub(crate) type PgBuilder = QueryBuilder<'static, Postgres>;

/// Quote an identifier for PostgreSQL.
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_kind(table: &TableSchema, name: &str) -> AppResult<ColumnKind> {
    table.column(name).map(|c| c.kind).ok_or_else(|| {
        AppError::validation(format!("Unknown column '{name}' on '{}'", table.name))
    })
}

fn column_list(table: &TableSchema) -> String {
    table
        .columns
        .iter()
        .map(|c| quote(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind a value; `Null` is bound with the column's type.
fn push_value(qb: &mut PgBuilder, value: &FieldValue, kind: ColumnKind) {
    match value {
        FieldValue::Int(v) => qb.push_bind(*v),
        FieldValue::BigInt(v) => qb.push_bind(*v),
        FieldValue::Text(v) => qb.push_bind(v.clone()),
        FieldValue::Timestamp(v) => qb.push_bind(*v),
        FieldValue::Bool(v) => qb.push_bind(*v),
        FieldValue::Null => match kind {
            ColumnKind::Int => qb.push_bind(None::<i32>),
            ColumnKind::BigInt => qb.push_bind(None::<i64>),
            ColumnKind::Text => qb.push_bind(None::<String>),
            ColumnKind::Timestamp => qb.push_bind(None::<DateTime<Utc>>),
            ColumnKind::Bool => qb.push_bind(None::<bool>),
        },
    };
}

fn push_where(qb: &mut PgBuilder, table: &TableSchema, filter: &Filter) -> AppResult<()> {
    for (i, condition) in filter.conditions.iter().enumerate() {
        let kind = column_kind(table, &condition.field)?;
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(quote(&condition.field));
        qb.push(" ");
        qb.push(condition.op.as_sql());
        if !condition.op.is_unary() {
            qb.push(" ");
            push_value(qb, &condition.value, kind);
        }
    }
    Ok(())
}

/// `SELECT` with filter, ordering, and window.
pub(crate) fn select(table: &TableSchema, spec: &QuerySpec) -> AppResult<PgBuilder> {
    let mut qb = PgBuilder::new(format!(
        "SELECT {} FROM {}",
        column_list(table),
        quote(table.name)
    ));
    push_where(&mut qb, table, &spec.filter)?;

    for (i, sort) in spec.order.iter().enumerate() {
        column_kind(table, &sort.field)?;
        qb.push(if i == 0 { " ORDER BY " } else { ", " });
        qb.push(quote(&sort.field));
        qb.push(" ");
        qb.push(sort.direction.as_sql());
    }

    if let Some(limit) = spec.limit {
        qb.push(" LIMIT ");
        qb.push_bind(clamp_i64(limit));
    }
    if let Some(offset) = spec.offset {
        qb.push(" OFFSET ");
        qb.push_bind(clamp_i64(offset));
    }
    Ok(qb)
}

/// `SELECT COUNT(*)` over a filter.
pub(crate) fn count(table: &TableSchema, filter: &Filter) -> AppResult<PgBuilder> {
    let mut qb = PgBuilder::new(format!("SELECT COUNT(*) FROM {}", quote(table.name)));
    push_where(&mut qb, table, filter)?;
    Ok(qb)
}

/// `DELETE` over a filter.
pub(crate) fn delete_where(table: &TableSchema, filter: &Filter) -> AppResult<PgBuilder> {
    let mut qb = PgBuilder::new(format!("DELETE FROM {}", quote(table.name)));
    push_where(&mut qb, table, filter)?;
    Ok(qb)
}

/// `INSERT ... RETURNING key`. The key column is omitted when it is `0`
/// so that the identity column assigns it.
pub(crate) fn insert(table: &TableSchema, record: &Record) -> PgBuilder {
    let explicit_key = table.key_of(record).is_some_and(|k| k != 0);
    let columns: Vec<_> = table
        .columns
        .iter()
        .filter(|c| explicit_key || c.name != table.key)
        .collect();

    let names = columns
        .iter()
        .map(|c| quote(c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut qb = PgBuilder::new(format!(
        "INSERT INTO {} ({names}) VALUES (",
        quote(table.name)
    ));
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        let value = record.get(column.name).unwrap_or(&FieldValue::Null);
        push_value(&mut qb, value, column.kind);
    }
    qb.push(format!(") RETURNING {}", quote(table.key)));
    qb
}

/// `UPDATE` of every value column, keyed by the record's key.
pub(crate) fn update(table: &TableSchema, record: &Record, key: i32) -> PgBuilder {
    let mut qb = PgBuilder::new(format!("UPDATE {} SET ", quote(table.name)));
    for (i, column) in table.value_columns().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(quote(column.name));
        qb.push(" = ");
        let value = record.get(column.name).unwrap_or(&FieldValue::Null);
        push_value(&mut qb, value, column.kind);
    }
    qb.push(format!(" WHERE {} = ", quote(table.key)));
    qb.push_bind(key);
    qb
}

/// `DELETE` of one row by key.
pub(crate) fn delete_key(table: &TableSchema, key: i32) -> PgBuilder {
    let mut qb = PgBuilder::new(format!(
        "DELETE FROM {} WHERE {} = ",
        quote(table.name),
        quote(table.key)
    ));
    qb.push_bind(key);
    qb
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
