//! Generic CRUD handlers.
//!
//! Each handler is generic over a [`RestResource`] and holds no
//! entity-specific logic. A unit of work is opened per request and every
//! write performs exactly one save.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Redirect;
use validator::Validate;

use autocatalog_core::error::AppError;
use autocatalog_core::result::AppResult;
use autocatalog_core::traits::Entity;
use autocatalog_core::types::PageRequest;
use autocatalog_entity::Brand;

use crate::extractors::ValidatedJson;
use crate::extractors::path::{parse_id, parse_route_int};
use crate::state::AppState;

/// An entity exposed over HTTP at `PATH`.
pub trait RestResource: Entity + Validate {
    /// Mount point, e.g. `/MarcasAutos`.
    const PATH: &'static str;

    /// JSON name of a struct field, used to key validation messages.
    fn wire_field(field: &str) -> &str {
        field
    }
}

impl RestResource for Brand {
    const PATH: &'static str = "/MarcasAutos";

    fn wire_field(field: &str) -> &str {
        match field {
            "description" => "descripcion",
            other => other,
        }
    }
}

fn not_found<T: RestResource>(id: i32) -> AppError {
    AppError::not_found(format!("{} {} not found", T::NAME, id))
}

/// GET /{resource}
pub async fn list<T: RestResource>(State(state): State<AppState>) -> AppResult<Json<Vec<T>>> {
    let uow = state.unit_of_work();
    let entities = uow.repository::<T>().get_all().fetch_all().await?;
    Ok(Json(entities))
}

/// GET /{resource}/{id}
///
/// A non-integer id does not match the route and answers 404.
pub async fn get_by_id<T: RestResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<T>> {
    let id = parse_route_int::<i32>(&id)?;
    let uow = state.unit_of_work();
    uow.repository::<T>()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>(id))
}

/// GET /{resource}/{page}/{page_size}
///
/// Newest first: ordered by key descending, then windowed.
pub async fn list_paged<T: RestResource>(
    State(state): State<AppState>,
    Path((page, page_size)): Path<(String, String)>,
) -> AppResult<Json<Vec<T>>> {
    let page = PageRequest::new(parse_route_int(&page)?, parse_route_int(&page_size)?)?;
    let uow = state.unit_of_work();
    let entities = uow
        .repository::<T>()
        .get_all()
        .order_by_key_desc()
        .page(page)
        .fetch_all()
        .await?;
    Ok(Json(entities))
}

/// POST /{resource}
///
/// The key is always assigned by the store; any key in the body is ignored.
pub async fn create<T: RestResource>(
    State(state): State<AppState>,
    ValidatedJson(mut entity): ValidatedJson<T>,
) -> AppResult<Json<T>> {
    entity.set_key(0);

    let uow = state.unit_of_work();
    let tracked = uow.repository::<T>().add(entity)?;
    uow.save().await?;

    tracing::info!(entity = T::NAME, id = tracked.key(), "created");
    Ok(Json(tracked.get()))
}

/// PUT /{resource}/{id}
pub async fn update<T: RestResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(entity): ValidatedJson<T>,
) -> AppResult<Redirect> {
    let id = parse_id(&id)?;
    if id != entity.key() {
        return Err(not_found::<T>(id));
    }

    let uow = state.unit_of_work();
    let repository = uow.repository::<T>();
    repository.update(&entity)?;

    match uow.save().await {
        Ok(_) => {}
        Err(e) if e.is_conflict() => {
            if repository.get_by_id(id).await?.is_none() {
                return Err(not_found::<T>(id));
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    }

    tracing::info!(entity = T::NAME, id, "updated");
    Ok(Redirect::to(T::PATH))
}

/// DELETE /{resource}/{id}
pub async fn delete<T: RestResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let id = parse_id(&id)?;

    let uow = state.unit_of_work();
    let repository = uow.repository::<T>();
    let entity = repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

    repository.remove(&entity)?;
    uow.save().await?;

    tracing::info!(entity = T::NAME, id, "deleted");
    Ok(Redirect::to(T::PATH))
}
