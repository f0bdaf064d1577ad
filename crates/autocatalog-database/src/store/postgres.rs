//! PostgreSQL store backed by the sqlx pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use autocatalog_core::error::{AppError, ErrorKind};
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Mutation, MutationKind, MutationOutcome, StoreProvider};
use autocatalog_core::types::{ColumnKind, FieldValue, Filter, QuerySpec, Record, TableSchema};

use super::sql;

/// Store that executes against PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Pool exhaustion and lost connections surface as 503; the rest as 500.
fn db_error(message: &str, e: sqlx::Error) -> AppError {
    let kind = match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, format!("{message}: {e}"), e)
}

fn conflict(mutation: &Mutation, key: i32) -> AppError {
    AppError::conflict(format!(
        "Expected to affect 1 row in '{}' (key {key}) but affected 0; \
         the row may have been modified or deleted",
        mutation.table.name
    ))
}

/// Decode a row using the table's column types.
fn decode_row(table: &TableSchema, row: &PgRow) -> AppResult<Record> {
    let mut record = Record::new();
    for column in table.columns {
        let name = column.name;
        let value = match column.kind {
            ColumnKind::Int => row.try_get::<Option<i32>, _>(name).map(FieldValue::from),
            ColumnKind::BigInt => row.try_get::<Option<i64>, _>(name).map(FieldValue::from),
            ColumnKind::Text => row.try_get::<Option<String>, _>(name).map(FieldValue::from),
            ColumnKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(name)
                .map(FieldValue::from),
            ColumnKind::Bool => row.try_get::<Option<bool>, _>(name).map(FieldValue::from),
        }
        .map_err(|e| db_error(&format!("Failed to decode column '{name}'"), e))?;
        record.insert(name, value);
    }
    Ok(record)
}

#[async_trait]
impl StoreProvider for PostgresStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, table: &TableSchema, spec: &QuerySpec) -> AppResult<Vec<Record>> {
        let mut qb = sql::select(table, spec)?;
        debug!(sql = qb.sql(), "select");
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to query '{}'", table.name), e))?;
        rows.iter().map(|row| decode_row(table, row)).collect()
    }

    async fn count(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        let mut qb = sql::count(table, filter)?;
        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to count '{}'", table.name), e))?;
        Ok(total.max(0) as u64)
    }

    async fn delete_where(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        let mut qb = sql::delete_where(table, filter)?;
        debug!(sql = qb.sql(), "bulk delete");
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to delete from '{}'", table.name), e))?;
        Ok(result.rows_affected())
    }

    async fn apply(&self, mutations: &[Mutation]) -> AppResult<Vec<MutationOutcome>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let mut outcomes = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            let table = &mutation.table;
            let outcome = match &mutation.kind {
                MutationKind::Insert(record) => {
                    let mut qb = sql::insert(table, record);
                    let key: i32 = qb
                        .build_query_scalar()
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(|e| db_error(&format!("Failed to insert into '{}'", table.name), e))?;
                    MutationOutcome {
                        rows_affected: 1,
                        key: Some(key),
                    }
                }
                MutationKind::Update(record) => {
                    let key = table.key_of(record).ok_or_else(|| {
                        AppError::validation(format!("Update on '{}' without a key", table.name))
                    })?;
                    let mut qb = sql::update(table, record, key);
                    let result = qb
                        .build()
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| db_error(&format!("Failed to update '{}'", table.name), e))?;
                    if result.rows_affected() == 0 {
                        return Err(conflict(mutation, key));
                    }
                    MutationOutcome {
                        rows_affected: result.rows_affected(),
                        key: None,
                    }
                }
                MutationKind::Delete(key) => {
                    let mut qb = sql::delete_key(table, *key);
                    let result = qb
                        .build()
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| db_error(&format!("Failed to delete from '{}'", table.name), e))?;
                    if result.rows_affected() == 0 {
                        return Err(conflict(mutation, *key));
                    }
                    MutationOutcome {
                        rows_affected: result.rows_affected(),
                        key: None,
                    }
                }
            };
            outcomes.push(outcome);
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(outcomes)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
