//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use autocatalog_api::{AppState, build_app};
use autocatalog_core::config::AppConfig;
use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::{Mutation, MutationOutcome, StoreProvider};
use autocatalog_core::types::{Filter, QuerySpec, Record, TableSchema};
use autocatalog_database::{MemoryStore, StoreManager};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store shared with the router, for direct checks
    pub store: StoreManager,
}

impl TestApp {
    /// A test application over the seeded in-memory catalog
    pub async fn new() -> Self {
        let store = MemoryStore::seeded().await.expect("Failed to seed store");
        Self::with_store(store)
    }

    /// A test application over an empty in-memory store
    pub fn empty() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// A test application whose saves always lose a concurrency race
    pub async fn conflicting() -> (Self, Arc<ConflictingStore>) {
        let inner = MemoryStore::seeded().await.expect("Failed to seed store");
        let store = Arc::new(ConflictingStore::new(inner));
        (Self::with_provider(store.clone()), store)
    }

    fn with_store(store: MemoryStore) -> Self {
        Self::with_provider(Arc::new(store))
    }

    fn with_provider(provider: Arc<dyn StoreProvider>) -> Self {
        let store = StoreManager::from_provider(provider);
        let state = AppState::new(AppConfig::in_memory(), store.clone());

        Self {
            router: build_app(state),
            store,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.request_raw(method, path, body_str).await
    }

    /// Make an HTTP request with a raw body
    pub async fn request_raw(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            location,
            body,
        }
    }

    /// Ids of every brand in list order
    pub async fn brand_ids(&self, path: &str) -> Vec<i64> {
        let response = self.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response
            .body
            .as_array()
            .expect("Expected a JSON array")
            .iter()
            .map(|b| b["id"].as_i64().expect("Missing id"))
            .collect()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// `Location` header, for redirects
    pub location: Option<String>,
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
}

/// Store whose batches always fail with a conflict while reads still see
/// the underlying rows
#[derive(Debug)]
pub struct ConflictingStore {
    inner: MemoryStore,
    applies: AtomicUsize,
    selects: AtomicUsize,
}

impl ConflictingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            applies: AtomicUsize::new(0),
            selects: AtomicUsize::new(0),
        }
    }

    /// Number of batches that were attempted
    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    /// Number of reads served
    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreProvider for ConflictingStore {
    fn kind(&self) -> &'static str {
        "conflicting"
    }

    async fn select(&self, table: &TableSchema, spec: &QuerySpec) -> AppResult<Vec<Record>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.select(table, spec).await
    }

    async fn count(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        self.inner.count(table, filter).await
    }

    async fn delete_where(&self, table: &TableSchema, filter: &Filter) -> AppResult<u64> {
        self.inner.delete_where(table, filter).await
    }

    async fn apply(&self, _mutations: &[Mutation]) -> AppResult<Vec<MutationOutcome>> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        Err(AppError::conflict("row was modified by another writer"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
