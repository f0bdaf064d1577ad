//! Per-unit-of-work session: the store handle plus the staged changes.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Mutation, MutationKind, StoreProvider};
use autocatalog_core::types::{Record, TableSchema};

use crate::store::StoreManager;

/// A staged insert whose record is read at save time and whose key is
/// written back once the store assigns it.
pub(crate) trait StagedRow: Send + Sync + fmt::Debug {
    fn record(&self) -> Record;
    fn assign_key(&self, key: i32);
}

#[derive(Debug)]
pub(crate) enum PendingChange {
    Insert {
        table: TableSchema,
        row: Arc<dyn StagedRow>,
    },
    Update {
        table: TableSchema,
        record: Record,
    },
    Delete {
        table: TableSchema,
        key: i32,
    },
}

impl PendingChange {
    fn to_mutation(&self) -> Mutation {
        match self {
            Self::Insert { table, row } => Mutation {
                table: *table,
                kind: MutationKind::Insert(row.record()),
            },
            Self::Update { table, record } => Mutation {
                table: *table,
                kind: MutationKind::Update(record.clone()),
            },
            Self::Delete { table, key } => Mutation {
                table: *table,
                kind: MutationKind::Delete(*key),
            },
        }
    }
}

pub(crate) struct Session {
    store: StoreManager,
    pending: Mutex<Vec<PendingChange>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store.kind())
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl Session {
    pub(crate) fn new(store: StoreManager) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn store(&self) -> &StoreManager {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PendingChange>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn stage(&self, change: PendingChange) {
        self.lock().push(change);
    }

    pub(crate) fn stage_all(&self, changes: impl IntoIterator<Item = PendingChange>) {
        self.lock().extend(changes);
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.lock().len()
    }

    /// Drop every staged change, returning how many were dropped.
    pub(crate) fn discard(&self) -> usize {
        let mut pending = self.lock();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    /// Apply every staged change as one batch.
    ///
    /// The pending list is emptied before the store is called; a failed
    /// batch is not retried and its changes are gone.
    pub(crate) async fn save(&self) -> AppResult<u64> {
        let changes = std::mem::take(&mut *self.lock());
        if changes.is_empty() {
            return Ok(0);
        }

        let mutations: Vec<Mutation> = changes.iter().map(PendingChange::to_mutation).collect();
        debug!(changes = mutations.len(), store = self.store.kind(), "applying staged changes");

        let outcomes = match self.store.apply(&mutations).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(discarded = changes.len(), error = %e, "save failed, staged changes discarded");
                return Err(e);
            }
        };

        let mut affected = 0;
        for (change, outcome) in changes.iter().zip(&outcomes) {
            affected += outcome.rows_affected;
            if let (PendingChange::Insert { row, .. }, Some(key)) = (change, outcome.key) {
                row.assign_key(key);
            }
        }
        Ok(affected)
    }
}
