//! Brand catalog handlers beyond the generic CRUD surface.

use axum::Json;
use axum::extract::State;

use autocatalog_core::result::AppResult;
use autocatalog_entity::Brand;

use crate::state::AppState;

/// GET /MarcasAutos/GetAllMarcasAutos
///
/// Always a JSON array; an empty table yields `[]`.
pub async fn get_all_brands(State(state): State<AppState>) -> AppResult<Json<Vec<Brand>>> {
    let uow = state.unit_of_work();
    let brands = uow.brands().get_all_brands().await?;
    Ok(Json(brands))
}
