pub mod health;
pub mod positions;
pub mod weather;

use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::services::positions::PositionAggregator;
use crate::services::weather::{UnifiedWeatherService, WeatherProviderKind};

/// Shared application state: one aggregator instance (and therefore one
/// cache slot) per process, owned here and injected into the handlers.
#[derive(Clone)]
pub struct AppState {
    pub positions: Arc<PositionAggregator>,
    pub weather: Arc<UnifiedWeatherService>,
    pub provider: WeatherProviderKind,
}

/// Common cache-bypass query parameter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RefreshQuery {
    /// Bypass the cache and refetch from the upstream provider
    #[serde(default)]
    pub refresh: bool,
}
