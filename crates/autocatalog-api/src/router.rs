//! Route definitions for the AutoCatalog HTTP API.
//!
//! Each resource is mounted at its own path by [`crud_routes`]. The router
//! receives `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::{Router, middleware as axum_middleware, routing::get};

use autocatalog_entity::Brand;

use crate::handlers;
use crate::handlers::crud::RestResource;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(brand_routes())
        .merge(health_routes())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// The generic CRUD surface for one resource.
pub fn crud_routes<T: RestResource>() -> Router<AppState> {
    let base = T::PATH;
    Router::new()
        .route(
            base,
            get(handlers::crud::list::<T>).post(handlers::crud::create::<T>),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(handlers::crud::get_by_id::<T>)
                .put(handlers::crud::update::<T>)
                .delete(handlers::crud::delete::<T>),
        )
        .route(
            &format!("{base}/{{page}}/{{page_size}}"),
            get(handlers::crud::list_paged::<T>),
        )
}

/// Brand catalog: CRUD plus the materialized-list alias.
fn brand_routes() -> Router<AppState> {
    crud_routes::<Brand>().route(
        &format!("{}/GetAllMarcasAutos", Brand::PATH),
        get(handlers::brand::get_all_brands),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
