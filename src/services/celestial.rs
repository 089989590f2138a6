//! Celestial position service client.
//!
//! Fetches precomputed positions from the external computation service:
//! a combined feed (preferred, may be unimplemented upstream), the daily
//! path / realtime override pair, and the sunrise endpoint used to enrich
//! weather snapshots.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{CelestialObject, PositionSample, SunTimes};

/// Per-call timeout — a hung position service must not block the
/// aggregator indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the celestial position service.
#[derive(Debug, Clone)]
pub struct CelestialClient {
    client: reqwest::Client,
    base_url: String,
}

impl CelestialClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalService(format!("celestial service request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "celestial service returned HTTP {} for /{}",
                response.status(),
                path
            )));
        }

        response.json().await.map_err(|e| {
            AppError::MalformedResponse(format!("celestial service JSON error for /{}: {}", path, e))
        })
    }

    /// Combined feed: already-merged objects, preferred when the upstream
    /// implements it. A 404 here is expected and handled by the caller.
    pub async fn fetch_combined(&self) -> Result<HashMap<String, CelestialObject>, AppError> {
        self.get_json("combined-positions").await
    }

    /// One full day of path samples per object.
    pub async fn fetch_daily(&self) -> Result<HashMap<String, CelestialObject>, AppError> {
        self.get_json("daily_positions").await
    }

    /// One current sample per object, overriding the daily path.
    pub async fn fetch_realtime(&self) -> Result<HashMap<String, PositionSample>, AppError> {
        self.get_json("realtime-positions").await
    }

    /// Sunrise / time-to-leave data for weather enrichment. Best-effort at
    /// the call site — failures here are swallowed by the weather service.
    pub async fn fetch_sun_times(&self) -> Result<SunTimes, AppError> {
        self.get_json("weather").await
    }
}
