//! Weather HTTP endpoint.
//!
//! - GET /api/v1/weather?refresh=true|false

use axum::extract::{Query, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::WeatherSnapshot;
use crate::routes::{AppState, RefreshQuery};

/// Get the current weather snapshot.
///
/// The configured provider is tried first; failures fall back to the mock
/// generator, so this endpoint does not fail when upstream weather
/// providers are down.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    params(RefreshQuery),
    responses(
        (status = 200, description = "Unified weather snapshot", body = WeatherSnapshot),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    let snapshot = state.weather.fetch_weather(params.refresh).await?;
    Ok(Json(snapshot))
}
