//! Unit of work: one session, many repositories, one save.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Entity, StoreProvider};

use crate::repositories::BrandRepository;
use crate::repository::Repository;
use crate::session::Session;
use crate::store::StoreManager;

/// Owns the session for one logical operation (typically one request).
///
/// Every repository handed out shares the session. Dropping or disposing
/// the unit of work invalidates them.
pub struct UnitOfWork {
    session: Arc<Session>,
    brands: BrandRepository,
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("session", &self.session)
            .finish()
    }
}

impl UnitOfWork {
    /// Open a new session on the store.
    pub fn begin(store: &StoreManager) -> Self {
        let session = Arc::new(Session::new(store.clone()));
        let brands = Repository::new(&session);
        debug!(store = store.kind(), "unit of work started");
        Self { session, brands }
    }

    /// A fresh repository for any entity type, bound to this session.
    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(&self.session)
    }

    /// The brand repository. The same instance for the lifetime of the unit of work.
    pub fn brands(&self) -> &BrandRepository {
        &self.brands
    }

    /// Number of staged changes not yet saved.
    pub fn pending_changes(&self) -> usize {
        self.session.pending_len()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.pending_changes() > 0
    }

    /// Commit every staged change atomically and return the rows affected.
    ///
    /// On failure the staged changes are discarded and the store is left as
    /// it was before the call.
    pub async fn save(&self) -> AppResult<u64> {
        let affected = self.session.save().await?;
        if affected > 0 {
            info!(affected, store = self.session.store().kind(), "unit of work committed");
        }
        Ok(affected)
    }

    /// Blocking form of [`save`](Self::save).
    ///
    /// Inside a tokio runtime this needs the multi-threaded flavor. Outside
    /// any runtime a temporary one is started for the call.
    pub fn save_blocking(&self) -> AppResult<u64> {
        match Handle::try_current() {
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => {
                    tokio::task::block_in_place(|| handle.block_on(self.save()))
                }
                _ => Err(AppError::internal(
                    "save_blocking cannot run on a current-thread runtime; use save().await",
                )),
            },
            Err(_) => Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(self.save()),
        }
    }

    /// Release the session, dropping any unsaved changes.
    pub fn dispose(self) {
        let dropped = self.session.discard();
        debug!(dropped, "unit of work disposed");
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let pending = self.session.pending_len();
        if pending > 0 {
            warn!(pending, "unit of work dropped with unsaved changes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocatalog_core::types::FilterField;
    use autocatalog_entity::Brand;

    use crate::store::MemoryStore;

    async fn store() -> StoreManager {
        StoreManager::from_provider(Arc::new(MemoryStore::seeded().await.unwrap()))
    }

    #[tokio::test]
    async fn test_changes_across_repositories_commit_together() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);

        let kia = uow.brands().add(Brand::new("Kia")).unwrap();
        let other = uow.repository::<Brand>();
        let mut toyota = other.get_by_id(1).await.unwrap().unwrap();
        toyota.description = "Toyota Motor".into();
        other.update(&toyota).unwrap();

        assert_eq!(uow.pending_changes(), 2);
        assert_eq!(uow.save().await.unwrap(), 2);
        assert!(!uow.has_pending_changes());
        assert_eq!(kia.key(), 5);

        let reread = UnitOfWork::begin(&store);
        let toyota = reread.brands().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(toyota.description, "Toyota Motor");
    }

    #[tokio::test]
    async fn test_failed_save_is_atomic() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);

        uow.brands().add(Brand::new("Kia")).unwrap();
        let mut ghost = Brand::new("Ghost");
        ghost.set_key(99);
        uow.brands().remove(&ghost).unwrap();

        assert!(uow.save().await.unwrap_err().is_conflict());
        assert!(!uow.has_pending_changes());
        assert_eq!(store.count(&Brand::TABLE, &Default::default()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_save_with_nothing_staged() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);
        assert_eq!(uow.save().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dispose_invalidates_repositories() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);
        let repo = uow.repository::<Brand>();
        repo.add(Brand::new("Kia")).unwrap();

        uow.dispose();

        assert!(repo.get_by_id(1).await.is_err());
        assert!(repo.bulk_remove(FilterField::gt("Id", 0)).await.is_err());
        assert_eq!(store.count(&Brand::TABLE, &Default::default()).await.unwrap(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_save_blocking_on_multi_thread_runtime() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);
        uow.brands().add(Brand::new("Kia")).unwrap();

        assert_eq!(uow.save_blocking().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_blocking_rejects_current_thread_runtime() {
        let store = store().await;
        let uow = UnitOfWork::begin(&store);
        uow.brands().add(Brand::new("Kia")).unwrap();

        assert!(uow.save_blocking().is_err());
    }

    #[test]
    fn test_save_blocking_outside_runtime() {
        let store = StoreManager::from_provider(Arc::new(MemoryStore::new()));
        let uow = UnitOfWork::begin(&store);
        let tracked = uow.brands().add(Brand::new("Kia")).unwrap();

        assert_eq!(uow.save_blocking().unwrap(), 1);
        assert_eq!(tracked.key(), 1);
    }
}
