//! Generic repository over any [`Entity`].
//!
//! A repository is a non-owning view of a unit of work's session. Reads go
//! straight to the store; `add`, `update` and the `remove` family are staged
//! and become durable on [`UnitOfWork::save`](crate::UnitOfWork::save).
//! [`Repository::bulk_remove`] is the exception and deletes immediately.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Entity, StoreProvider};
use autocatalog_core::types::{Filter, FilterField, PageRequest, QuerySpec, SortField};

use crate::session::{PendingChange, Session, StagedRow};

fn upgrade(session: &Weak<Session>) -> AppResult<Arc<Session>> {
    session
        .upgrade()
        .ok_or_else(|| AppError::internal("Unit of work has been disposed"))
}

fn key_filter<T: Entity>(key: i32) -> Filter {
    Filter::from(FilterField::eq(T::TABLE.key, key))
}

/// Handle to an entity staged for insertion.
///
/// The handle shares the staged value with the unit of work; once the
/// insert is saved it carries the key the store assigned.
pub struct Tracked<T: Entity> {
    inner: Arc<TrackedCell<T>>,
}

struct TrackedCell<T>(Mutex<T>);

impl<T> TrackedCell<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Entity> fmt::Debug for TrackedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("entity", &T::NAME)
            .field("key", &self.lock().key())
            .finish()
    }
}

impl<T: Entity> StagedRow for TrackedCell<T> {
    fn record(&self) -> autocatalog_core::types::Record {
        self.lock().to_record()
    }

    fn assign_key(&self, key: i32) {
        self.lock().set_key(key);
    }
}

impl<T: Entity> Tracked<T> {
    fn new(entity: T) -> Self {
        Self {
            inner: Arc::new(TrackedCell(Mutex::new(entity))),
        }
    }

    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }

    /// The key; `0` until the insert has been saved.
    pub fn key(&self) -> i32 {
        self.inner.lock().key()
    }

    /// Change the staged value before it is saved.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.lock());
    }
}

impl<T: Entity> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Data-access surface for one entity type.
pub struct Repository<T: Entity> {
    session: Weak<Session>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            session: Weak::clone(&self.session),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &T::NAME)
            .field("table", &T::TABLE.name)
            .field("live", &(self.session.strong_count() > 0))
            .finish()
    }
}

impl<T: Entity> Repository<T> {
    pub(crate) fn new(session: &Arc<Session>) -> Self {
        Self {
            session: Arc::downgrade(session),
            _entity: PhantomData,
        }
    }

    fn session(&self) -> AppResult<Arc<Session>> {
        upgrade(&self.session)
    }

    /// Point lookup by key. Absent is `Ok(None)`.
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<T>> {
        debug!(entity = T::NAME, id, "get_by_id");
        self.first_or_default(key_filter::<T>(id)).await
    }

    /// A lazy query over every row of the table.
    pub fn get_all(&self) -> Query<T> {
        Query::new(Weak::clone(&self.session))
    }

    /// First row matching `filter` in the store's natural order.
    pub async fn first_or_default(&self, filter: impl Into<Filter>) -> AppResult<Option<T>> {
        self.get_all().filter(filter).first().await
    }

    /// Stage a new entity for insertion.
    pub fn add(&self, entity: T) -> AppResult<Tracked<T>> {
        let session = self.session()?;
        let tracked = Tracked::new(entity);
        session.stage(PendingChange::Insert {
            table: T::TABLE,
            row: tracked.inner.clone(),
        });
        debug!(entity = T::NAME, "staged insert");
        Ok(tracked)
    }

    /// Stage several new entities for insertion.
    pub fn add_range(&self, entities: impl IntoIterator<Item = T>) -> AppResult<Vec<Tracked<T>>> {
        let session = self.session()?;
        let tracked: Vec<Tracked<T>> = entities.into_iter().map(Tracked::new).collect();
        session.stage_all(tracked.iter().map(|t| PendingChange::Insert {
            table: T::TABLE,
            row: t.inner.clone(),
        }));
        debug!(entity = T::NAME, count = tracked.len(), "staged inserts");
        Ok(tracked)
    }

    /// Stage deletion of an entity by its key.
    pub fn remove(&self, entity: &T) -> AppResult<()> {
        let session = self.session()?;
        session.stage(PendingChange::Delete {
            table: T::TABLE,
            key: entity.key(),
        });
        debug!(entity = T::NAME, id = entity.key(), "staged delete");
        Ok(())
    }

    /// Stage deletion of the row with `id`.
    ///
    /// Nothing is staged when no such row exists.
    pub async fn remove_by_id(&self, id: i32) -> AppResult<bool> {
        match self.get_by_id(id).await? {
            Some(entity) => {
                self.remove(&entity)?;
                Ok(true)
            }
            None => {
                debug!(entity = T::NAME, id, "remove_by_id: no such row");
                Ok(false)
            }
        }
    }

    /// Stage deletion of several entities.
    pub fn remove_range<'a>(&self, entities: impl IntoIterator<Item = &'a T>) -> AppResult<()> {
        let session = self.session()?;
        session.stage_all(entities.into_iter().map(|e| PendingChange::Delete {
            table: T::TABLE,
            key: e.key(),
        }));
        Ok(())
    }

    /// Delete every row matching `filter` right away, outside the staged
    /// batch. Returns the number of rows deleted.
    pub async fn bulk_remove(&self, filter: impl Into<Filter>) -> AppResult<u64> {
        let session = self.session()?;
        let pending = session.pending_len();
        if pending > 0 {
            warn!(
                entity = T::NAME,
                pending, "bulk_remove runs immediately and is not part of the pending save"
            );
        }
        let removed = session
            .store()
            .delete_where(&T::TABLE, &filter.into())
            .await?;
        debug!(entity = T::NAME, removed, "bulk_remove");
        Ok(removed)
    }

    /// Stage a full replacement of the row with the entity's key.
    pub fn update(&self, entity: &T) -> AppResult<()> {
        let session = self.session()?;
        session.stage(PendingChange::Update {
            table: T::TABLE,
            record: entity.to_record(),
        });
        debug!(entity = T::NAME, id = entity.key(), "staged update");
        Ok(())
    }

    /// Stage full replacements for several entities.
    pub fn update_range<'a>(&self, entities: impl IntoIterator<Item = &'a T>) -> AppResult<()> {
        let session = self.session()?;
        session.stage_all(entities.into_iter().map(|e| PendingChange::Update {
            table: T::TABLE,
            record: e.to_record(),
        }));
        Ok(())
    }
}

/// A composable query that runs only when materialized.
///
/// Every call to [`fetch_all`](Query::fetch_all), [`first`](Query::first) or
/// [`count`](Query::count) goes back to the store.
pub struct Query<T: Entity> {
    session: Weak<Session>,
    spec: QuerySpec,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            session: Weak::clone(&self.session),
            spec: self.spec.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity", &T::NAME)
            .field("spec", &self.spec)
            .finish()
    }
}

impl<T: Entity> Query<T> {
    fn new(session: Weak<Session>) -> Self {
        Self {
            session,
            spec: QuerySpec::all(),
            _entity: PhantomData,
        }
    }

    /// Narrow the query. Conditions accumulate.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.spec
            .filter
            .conditions
            .extend(filter.into().conditions);
        self
    }

    /// Append a sort field.
    pub fn order_by(mut self, sort: SortField) -> Self {
        self.spec.order.push(sort);
        self
    }

    pub fn order_by_key(self) -> Self {
        self.order_by(SortField::asc(T::TABLE.key))
    }

    pub fn order_by_key_desc(self) -> Self {
        self.order_by(SortField::desc(T::TABLE.key))
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.spec.offset = Some(n);
        self
    }

    pub fn take(mut self, n: u64) -> Self {
        self.spec.limit = Some(n);
        self
    }

    /// Window the query to one page.
    pub fn page(self, page: PageRequest) -> Self {
        self.skip(page.offset()).take(page.limit())
    }

    pub async fn fetch_all(&self) -> AppResult<Vec<T>> {
        let session = upgrade(&self.session)?;
        let rows = session.store().select(&T::TABLE, &self.spec).await?;
        debug!(entity = T::NAME, rows = rows.len(), "query");
        rows.into_iter().map(T::from_record).collect()
    }

    /// The first row, ignoring any `take` already set.
    pub async fn first(&self) -> AppResult<Option<T>> {
        let windowed = self.clone().take(1);
        Ok(windowed.fetch_all().await?.into_iter().next())
    }

    /// Number of rows matching the filter. Ordering and windowing are ignored.
    pub async fn count(&self) -> AppResult<u64> {
        let session = upgrade(&self.session)?;
        session.store().count(&T::TABLE, &self.spec.filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocatalog_core::error::ErrorKind;
    use autocatalog_entity::Brand;

    use crate::store::{MemoryStore, StoreManager};

    async fn session() -> Arc<Session> {
        let store = MemoryStore::seeded().await.unwrap();
        Arc::new(Session::new(StoreManager::from_provider(Arc::new(store))))
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);

        let brand = repo.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(brand.description, "Nissan");
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_is_restartable() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);
        let query = repo.get_all().order_by_key_desc();

        assert_eq!(query.fetch_all().await.unwrap().len(), 4);

        session
            .store()
            .delete_where(&Brand::TABLE, &FilterField::eq("Id", 4).into())
            .await
            .unwrap();

        let again = query.fetch_all().await.unwrap();
        assert_eq!(again.len(), 3);
        assert_eq!(again[0].id(), 3);
    }

    #[tokio::test]
    async fn test_page_window() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);
        let page = PageRequest::new(2, 3).unwrap();

        let rows = repo
            .get_all()
            .order_by_key_desc()
            .page(page)
            .fetch_all()
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(Brand::id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_first_or_default_with_filter() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);

        let hit = repo
            .first_or_default(FilterField::ilike("Descripcion", "%SUZ%"))
            .await
            .unwrap();
        assert_eq!(hit.map(|b| b.id()), Some(4));

        let miss = repo
            .first_or_default(FilterField::eq("Descripcion", "Kia"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_staged_changes_wait_for_save() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);

        let kia = repo.add(Brand::new("Kia")).unwrap();
        repo.remove_by_id(1).await.unwrap();
        assert_eq!(session.pending_len(), 2);
        assert_eq!(repo.get_all().count().await.unwrap(), 4);

        assert_eq!(session.save().await.unwrap(), 2);
        assert_eq!(kia.key(), 5);
        assert!(repo.get_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_by_id_missing_is_noop() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);

        assert!(!repo.remove_by_id(99).await.unwrap());
        assert_eq!(session.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_bulk_remove_is_immediate() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);
        repo.add(Brand::new("Kia")).unwrap();

        let removed = repo
            .bulk_remove(FilterField::lt("Id", 3))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.get_all().count().await.unwrap(), 2);
        assert_eq!(session.pending_len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_row_conflicts() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);
        let mut ghost = Brand::new("Ghost");
        ghost.set_key(77);

        repo.update(&ghost).unwrap();
        let err = session.save().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(session.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_dropped_session_invalidates_repository() {
        let session = session().await;
        let repo = Repository::<Brand>::new(&session);
        drop(session);

        let err = repo.get_by_id(1).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(repo.add(Brand::new("Kia")).is_err());
    }
}
