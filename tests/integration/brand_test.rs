//! Integration tests for the brand catalog endpoints.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_list_seeded_brands() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/MarcasAutos", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let brands = response.body.as_array().unwrap();
    assert_eq!(brands.len(), 4);
    let names: Vec<_> = brands
        .iter()
        .map(|b| b["descripcion"].as_str().unwrap())
        .collect();
    for expected in ["Toyota", "Nissan", "Hyundai", "Suzuki"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    assert_eq!(brands[0]["fIngreso"], "2024-12-29T09:53:21.944Z");
}

#[tokio::test]
async fn test_create_get_delete_lifecycle() {
    let app = TestApp::new().await;

    let created = app
        .request("POST", "/MarcasAutos", Some(json!({ "Descripcion": "Kia" })))
        .await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    assert_eq!(created.body["id"], 5);
    assert_eq!(created.body["descripcion"], "Kia");

    let fetched = app.request("GET", "/MarcasAutos/5", None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let deleted = app.request("DELETE", "/MarcasAutos/5", None).await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);
    assert_eq!(deleted.location.as_deref(), Some("/MarcasAutos"));

    let gone = app.request("GET", "/MarcasAutos/5", None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let app = TestApp::new().await;

    let created = app
        .request("POST", "/MarcasAutos", Some(json!({ "id": 2, "descripcion": "Mazda" })))
        .await;

    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["id"], 5);
    assert_eq!(app.brand_ids("/MarcasAutos").await, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_create_validation_error() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/MarcasAutos", Some(json!({ "descripcion": "" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["details"]["descripcion"].is_array());
    assert_eq!(app.brand_ids("/MarcasAutos").await.len(), 4);
}

#[tokio::test]
async fn test_create_malformed_body() {
    let app = TestApp::new().await;

    let response = app
        .request_raw("POST", "/MarcasAutos", "{not json".to_string())
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_and_non_integer_ids() {
    let app = TestApp::new().await;

    assert_eq!(
        app.request("GET", "/MarcasAutos/99", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.request("GET", "/MarcasAutos/abc", None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_paged_listing_is_descending_window() {
    let app = TestApp::new().await;

    assert_eq!(app.brand_ids("/MarcasAutos/1/3").await, vec![4, 3, 2]);
    assert_eq!(app.brand_ids("/MarcasAutos/2/3").await, vec![1]);
    assert_eq!(app.brand_ids("/MarcasAutos/2/2").await, vec![2, 1]);
    assert!(app.brand_ids("/MarcasAutos/3/2").await.is_empty());
}

#[tokio::test]
async fn test_paged_listing_rejects_non_positive_values() {
    let app = TestApp::new().await;

    assert_eq!(
        app.request("GET", "/MarcasAutos/0/3", None).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.request("GET", "/MarcasAutos/1/0", None).await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_update_redirects_and_persists() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/MarcasAutos/2",
            Some(json!({ "id": 2, "descripcion": "Nissan Motor" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/MarcasAutos"));

    let fetched = app.request("GET", "/MarcasAutos/2", None).await;
    assert_eq!(fetched.body["descripcion"], "Nissan Motor");
}

#[tokio::test]
async fn test_update_id_mismatch_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/MarcasAutos/1",
            Some(json!({ "id": 2, "descripcion": "Renamed" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let untouched = app.request("GET", "/MarcasAutos/2", None).await;
    assert_eq!(untouched.body["descripcion"], "Nissan");
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/MarcasAutos/42",
            Some(json!({ "id": 42, "descripcion": "Ghost" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.brand_ids("/MarcasAutos").await.len(), 4);
}

#[tokio::test]
async fn test_update_conflict_on_missing_row_is_not_found() {
    let (app, store) = TestApp::conflicting().await;

    let response = app
        .request(
            "PUT",
            "/MarcasAutos/42",
            Some(json!({ "id": 42, "descripcion": "Ghost" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    // The save was attempted first; the lookup only ran after it conflicted.
    assert_eq!(store.applies(), 1);
    assert_eq!(store.selects(), 1);
}

#[tokio::test]
async fn test_update_conflict_on_existing_row_is_conflict() {
    let (app, store) = TestApp::conflicting().await;

    let response = app
        .request(
            "PUT",
            "/MarcasAutos/1",
            Some(json!({ "id": 1, "descripcion": "Toyota Motor" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
    assert_eq!(store.applies(), 1);
    assert_eq!(store.selects(), 1);
}

#[tokio::test]
async fn test_delete_conflict_is_conflict() {
    let (app, store) = TestApp::conflicting().await;

    let response = app.request("DELETE", "/MarcasAutos/2", None).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
    assert_eq!(store.applies(), 1);
    assert_eq!(app.brand_ids("/MarcasAutos").await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_update_and_delete_non_integer_id_is_bad_request() {
    let app = TestApp::new().await;

    let put = app
        .request(
            "PUT",
            "/MarcasAutos/abc",
            Some(json!({ "id": 1, "descripcion": "Toyota" })),
        )
        .await;
    assert_eq!(put.status, StatusCode::BAD_REQUEST);

    let delete = app.request("DELETE", "/MarcasAutos/abc", None).await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request("DELETE", "/MarcasAutos/99", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.brand_ids("/MarcasAutos").await.len(), 4);
}

#[tokio::test]
async fn test_alias_returns_all_brands() {
    let app = TestApp::new().await;

    assert_eq!(
        app.brand_ids("/MarcasAutos/GetAllMarcasAutos").await,
        vec![1, 2, 3, 4]
    );
}

#[tokio::test]
async fn test_alias_on_empty_table_is_empty_array() {
    let app = TestApp::empty();

    let response = app.request("GET", "/MarcasAutos/GetAllMarcasAutos", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["provider"], "memory");
}
