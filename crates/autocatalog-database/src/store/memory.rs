//! In-memory store.
//!
//! Tables are ordered maps keyed by the identity key, so the natural
//! iteration order is ascending key. Batches are applied to a copy of the
//! tables and swapped in only when every mutation succeeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Entity, Mutation, MutationKind, MutationOutcome, StoreProvider};
use autocatalog_core::types::{FieldValue, Filter, QuerySpec, Record, SortDirection, TableSchema};
use autocatalog_entity::catalog::{Brand, seed_brands};

#[derive(Debug, Clone)]
struct MemoryTable {
    rows: BTreeMap<i32, Record>,
    /// Next identity value; wider than the key so exhaustion is observable.
    next_key: i64,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_key: 1,
        }
    }
}

type Tables = HashMap<&'static str, MemoryTable>;

/// Store that keeps every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the same catalog rows the initial migration inserts.
    pub async fn seeded() -> AppResult<Self> {
        let store = Self::new();
        store
            .insert_rows(&Brand::TABLE, seed_brands().iter().map(Entity::to_record))
            .await?;
        Ok(store)
    }

    /// Insert rows directly, outside any unit of work.
    pub async fn insert_rows(
        &self,
        table: &TableSchema,
        rows: impl IntoIterator<Item = Record>,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let target = tables.entry(table.name).or_default();
        for record in rows {
            insert_row(table, target, record)?;
        }
        Ok(())
    }

    /// Number of rows currently stored in a table.
    pub async fn len(&self, table: &TableSchema) -> usize {
        self.tables
            .read()
            .await
            .get(table.name)
            .map_or(0, |t| t.rows.len())
    }
}

fn check_columns(table: &TableSchema, spec_filter: &Filter) -> AppResult<()> {
    for condition in &spec_filter.conditions {
        if !table.has_column(&condition.field) {
            return Err(AppError::validation(format!(
                "Unknown column '{}' on '{}'",
                condition.field, table.name
            )));
        }
    }
    Ok(())
}

fn check_not_null(table: &TableSchema, record: &Record) -> AppResult<()> {
    for column in table.value_columns().filter(|c| !c.nullable) {
        if record.get(column.name).is_none_or(FieldValue::is_null) {
            return Err(AppError::database(format!(
                "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                column.name, table.name
            )));
        }
    }
    Ok(())
}

/// Keep only the table's columns.
fn project(table: &TableSchema, mut record: Record) -> Record {
    record.retain(|name, _| table.has_column(name));
    record
}

fn insert_row(table: &TableSchema, target: &mut MemoryTable, record: Record) -> AppResult<i32> {
    check_not_null(table, &record)?;
    let mut record = project(table, record);

    let key = match table.key_of(&record) {
        Some(key) if key != 0 => {
            if target.rows.contains_key(&key) {
                return Err(AppError::database(format!(
                    "duplicate key value violates unique constraint on \"{}\" (key {key})",
                    table.name
                )));
            }
            target.next_key = target.next_key.max(i64::from(key) + 1);
            key
        }
        _ => {
            let key = i32::try_from(target.next_key).map_err(|_| {
                AppError::database(format!(
                    "identity column \"{}\" of relation \"{}\" reached its maximum value",
                    table.key, table.name
                ))
            })?;
            if target.rows.contains_key(&key) {
                return Err(AppError::database(format!(
                    "duplicate key value violates unique constraint on \"{}\" (key {key})",
                    table.name
                )));
            }
            target.next_key = i64::from(key) + 1;
            key
        }
    };

    record.insert(table.key, FieldValue::Int(key));
    target.rows.insert(key, record);
    Ok(key)
}

fn conflict(table: &TableSchema, key: i32) -> AppError {
    AppError::conflict(format!(
        "Expected to affect 1 row in '{}' (key {key}) but affected 0; \
         the row may have been modified or deleted",
        table.name
    ))
}

fn apply_one(tables: &mut Tables, mutation: &Mutation) -> AppResult<MutationOutcome> {
    let table = &mutation.table;
    let target = tables.entry(table.name).or_default();

    match &mutation.kind {
        MutationKind::Insert(record) => {
            let key = insert_row(table, target, record.clone())?;
            Ok(MutationOutcome {
                rows_affected: 1,
                key: Some(key),
            })
        }
        MutationKind::Update(record) => {
            let key = table.key_of(record).ok_or_else(|| {
                AppError::validation(format!("Update on '{}' without a key", table.name))
            })?;
            check_not_null(table, record)?;
            let Some(existing) = target.rows.get_mut(&key) else {
                return Err(conflict(table, key));
            };
            for column in table.value_columns() {
                let value = record.get(column.name).cloned().unwrap_or(FieldValue::Null);
                existing.insert(column.name, value);
            }
            Ok(MutationOutcome {
                rows_affected: 1,
                key: None,
            })
        }
        MutationKind::Delete(key) => match target.rows.remove(key) {
            Some(_) => Ok(MutationOutcome {
                rows_affected: 1,
                key: None,
            }),
            None => Err(conflict(table, *key)),
        },
    }
}

#[async_trait]
impl StoreProvider for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &TableSchema, spec: &QuerySpec) -> AppResult<Vec<Record>> {
        check_columns(table, &spec.filter)?;
        for sort in &spec.order {
            if !table.has_column(&sort.field) {
                return Err(AppError::validation(format!(
                    "Unknown column '{}' on '{}'",
                    sort.field, table.name
                )));
            }
        }

        let tables = self.tables.read().await;
        let Some(source) = tables.get(table.name) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Record> = source
            .rows
            .values()
            .filter(|record| spec.filter.matches(record))
            .cloned()
            .collect();
        drop(tables);

        if !spec.order.is_empty() {
            rows.sort_by(|a, b| {
                spec.order
                    .iter()
                    .map(|sort| {
                        let left = a.get(sort.field.as_str()).unwrap_or(&FieldValue::Null);
                        let right = b.get(sort.field.as_str()).unwrap_or(&FieldValue::Null);
                        match sort.direction {
                            SortDirection::Asc => left.sort_cmp(right),
                            SortDirection::Desc => right.sort_cmp(left),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let offset = usize::try_from(spec.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = spec
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        check_columns(table, filter)?;
        let tables = self.tables.read().await;
        Ok(tables.get(table.name).map_or(0, |t| {
            t.rows.values().filter(|r| filter.matches(r)).count() as u64
        }))
    }

    async fn delete_where(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        check_columns(table, filter)?;
        let mut tables = self.tables.write().await;
        let Some(target) = tables.get_mut(table.name) else {
            return Ok(0);
        };
        let before = target.rows.len();
        target.rows.retain(|_, record| !filter.matches(record));
        let removed = (before - target.rows.len()) as u64;
        debug!(table = table.name, removed, "bulk delete");
        Ok(removed)
    }

    async fn apply(&self, mutations: &[Mutation]) -> AppResult<Vec<MutationOutcome>> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();

        let outcomes = mutations
            .iter()
            .map(|mutation| apply_one(&mut staged, mutation))
            .collect::<AppResult<Vec<_>>>()?;

        *tables = staged;
        Ok(outcomes)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
