//! Position HTTP endpoint.
//!
//! - GET /api/v1/positions?refresh=true|false

use axum::extract::{Query, State};
use axum::Json;
use std::collections::HashMap;

use crate::errors::{AppError, ErrorResponse};
use crate::models::CelestialObject;
use crate::routes::{AppState, RefreshQuery};

/// Get the merged celestial position map.
///
/// Serves the cached mapping when fresh; otherwise fetches from the
/// position service (combined feed first, daily + realtime fallback pair
/// second). Fails with 502 when every upstream path is down — the
/// dashboard must know position data is unavailable.
#[utoipa::path(
    get,
    path = "/api/v1/positions",
    tag = "Positions",
    params(RefreshQuery),
    responses(
        (status = 200, description = "Merged object map, keyed by object name",
         body = HashMap<String, CelestialObject>),
        (status = 502, description = "Position provider unavailable", body = ErrorResponse),
    )
)]
pub async fn get_positions(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
) -> Result<Json<HashMap<String, CelestialObject>>, AppError> {
    let objects = state.positions.fetch_positions(params.refresh).await?;
    Ok(Json(objects))
}
