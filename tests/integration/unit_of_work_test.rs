//! Integration tests for the repository / unit-of-work layer.

use std::sync::Arc;

use autocatalog_core::error::ErrorKind;
use autocatalog_core::traits::{Entity, StoreProvider};
use autocatalog_core::types::{Filter, FilterField, SortField};
use autocatalog_database::{MemoryStore, StoreManager, UnitOfWork};
use autocatalog_entity::Brand;

async fn seeded_store() -> StoreManager {
    let store = MemoryStore::seeded().await.expect("Failed to seed store");
    StoreManager::from_provider(Arc::new(store))
}

async fn count(store: &StoreManager) -> u64 {
    store
        .count(&Brand::TABLE, &Filter::all())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_add_range_assigns_sequential_keys() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);

    let tracked = uow
        .brands()
        .add_range(["Kia", "Mazda", "Honda"].map(Brand::new))
        .unwrap();
    assert!(tracked.iter().all(|t| t.key() == 0));

    assert_eq!(uow.save().await.unwrap(), 3);
    let keys: Vec<_> = tracked.iter().map(|t| t.key()).collect();
    assert_eq!(keys, vec![5, 6, 7]);
    assert_eq!(count(&store).await, 7);
}

#[tokio::test]
async fn test_tracked_changes_before_save_are_persisted() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);

    let tracked = uow.brands().add(Brand::new("Kai")).unwrap();
    tracked.modify(|b| b.description = "Kia".into());
    uow.save().await.unwrap();

    let saved = uow.brands().get_by_id(tracked.key()).await.unwrap().unwrap();
    assert_eq!(saved.description, "Kia");
    assert_eq!(saved, tracked.get());
}

#[tokio::test]
async fn test_update_range_and_remove_range() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);
    let repo = uow.repository::<Brand>();

    let mut all = repo.get_all().order_by_key().fetch_all().await.unwrap();
    for brand in &mut all {
        brand.description = brand.description.to_uppercase();
    }
    repo.update_range(&all[..2]).unwrap();
    repo.remove_range(&all[2..]).unwrap();
    assert_eq!(uow.pending_changes(), 4);

    assert_eq!(uow.save().await.unwrap(), 4);

    let remaining = repo.get_all().order_by_key().fetch_all().await.unwrap();
    let names: Vec<_> = remaining.iter().map(|b| b.description.as_str()).collect();
    assert_eq!(names, vec!["TOYOTA", "NISSAN"]);
}

#[tokio::test]
async fn test_repositories_share_one_commit() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);

    uow.brands().add(Brand::new("Kia")).unwrap();
    uow.repository::<Brand>().remove_by_id(1).await.unwrap();
    assert_eq!(count(&store).await, 4);

    uow.save().await.unwrap();
    assert_eq!(count(&store).await, 4);
    assert!(uow.brands().get_by_id(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_first_or_default_natural_and_explicit_order() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);
    let repo = uow.brands();

    let first = repo
        .first_or_default(FilterField::gt("Id", 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.id(), 2);

    let last = repo
        .get_all()
        .filter(FilterField::gt("Id", 1))
        .order_by(SortField::desc("Descripcion"))
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.description, "Suzuki");
}

#[tokio::test]
async fn test_bulk_remove_bypasses_save() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);

    let removed = uow
        .brands()
        .bulk_remove(FilterField::ilike("Descripcion", "%a%"))
        .await
        .unwrap();

    // Toyota, Nissan, Hyundai
    assert_eq!(removed, 3);
    assert_eq!(count(&store).await, 1);
    assert!(!uow.has_pending_changes());
}

#[tokio::test]
async fn test_unknown_filter_column_is_rejected() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);

    let err = uow
        .brands()
        .first_or_default(FilterField::eq("Nombre", "Kia"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_dispose_drops_unsaved_changes() {
    let store = seeded_store().await;
    let uow = UnitOfWork::begin(&store);
    let repo = uow.repository::<Brand>();
    repo.add(Brand::new("Kia")).unwrap();

    uow.dispose();

    assert!(repo.get_all().fetch_all().await.is_err());
    assert_eq!(count(&store).await, 4);
}
