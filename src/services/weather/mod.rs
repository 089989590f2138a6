//! Unified weather service.
//!
//! Selects the configured provider, walks an explicit fallback chain until
//! a snapshot is produced, enriches it with sunrise data from the celestial
//! service, and caches the result under its own validity window —
//! independent of the per-adapter caches.

pub mod mock;
pub mod tomorrow;

use std::time::Duration;

use crate::cache::SlotCache;
use crate::errors::AppError;
use crate::models::WeatherSnapshot;
use crate::services::celestial::CelestialClient;
use mock::MockWeather;
use tomorrow::TomorrowClient;

/// Configured weather backend. Fixed per process — fallbacks are taken per
/// call, the active provider never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherProviderKind {
    Tomorrow,
    OpenWeatherMap,
    Mock,
}

impl WeatherProviderKind {
    /// Parse a configured provider name. Unknown names degrade to mock
    /// with a warning, mirroring the fallback-first policy everywhere else.
    pub fn parse(name: &str) -> Self {
        match name {
            "tomorrow" => Self::Tomorrow,
            "openweathermap" => Self::OpenWeatherMap,
            "mock" => Self::Mock,
            other => {
                tracing::warn!("Unknown weather provider '{}', using mock", other);
                Self::Mock
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tomorrow => "tomorrow",
            Self::OpenWeatherMap => "openweathermap",
            Self::Mock => "mock",
        }
    }
}

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderAttempt {
    Tomorrow,
    Mock,
}

/// Build the ordered attempt list for a configuration. Every chain ends in
/// mock, which cannot fail, so `fetch_weather` is total in practice.
fn build_attempts(provider: WeatherProviderKind, has_tomorrow_key: bool) -> Vec<ProviderAttempt> {
    match provider {
        WeatherProviderKind::Tomorrow if has_tomorrow_key => {
            vec![ProviderAttempt::Tomorrow, ProviderAttempt::Mock]
        }
        WeatherProviderKind::Tomorrow => {
            tracing::warn!("Tomorrow.io API key not set, weather will come from mock data");
            vec![ProviderAttempt::Mock]
        }
        WeatherProviderKind::OpenWeatherMap => {
            tracing::warn!("OpenWeatherMap provider not yet implemented, using mock data");
            vec![ProviderAttempt::Mock]
        }
        WeatherProviderKind::Mock => vec![ProviderAttempt::Mock],
    }
}

#[derive(Debug)]
pub struct UnifiedWeatherService {
    provider: WeatherProviderKind,
    attempts: Vec<ProviderAttempt>,
    tomorrow: Option<TomorrowClient>,
    mock: MockWeather,
    celestial: CelestialClient,
    cache: SlotCache<WeatherSnapshot>,
}

impl UnifiedWeatherService {
    pub fn new(
        provider: WeatherProviderKind,
        tomorrow: Option<TomorrowClient>,
        mock: MockWeather,
        celestial: CelestialClient,
        cache_validity: Duration,
    ) -> Self {
        let attempts = build_attempts(provider, tomorrow.is_some());
        Self {
            provider,
            attempts,
            tomorrow,
            mock,
            celestial,
            cache: SlotCache::new(cache_validity),
        }
    }

    /// Fetch the unified snapshot, serving from cache when fresh.
    ///
    /// Returns `Result` for symmetry with the router; with mock terminating
    /// every fallback chain the operation is total in practice.
    pub async fn fetch_weather(&self, force_refresh: bool) -> Result<WeatherSnapshot, AppError> {
        self.cache
            .get_or_refresh(force_refresh, || self.refresh(force_refresh))
            .await
    }

    async fn refresh(&self, force_refresh: bool) -> Result<WeatherSnapshot, AppError> {
        let mut snapshot = self.obtain(force_refresh).await;

        // The snapshot is tagged with the configured provider, even when a
        // fallback actually served it.
        snapshot.source = self.provider.as_str().to_string();

        // Best-effort sunrise enrichment; a failure leaves the fields empty.
        match self.celestial.fetch_sun_times().await {
            Ok(sun) => {
                snapshot.sunrise_time = sun.sunrise_time;
                snapshot.time_to_leave = sun.time_to_leave;
            }
            Err(err) => {
                tracing::warn!("Sunrise enrichment failed, leaving fields empty: {}", err);
            }
        }

        Ok(snapshot)
    }

    /// Walk the attempt chain until a snapshot is produced.
    async fn obtain(&self, force_refresh: bool) -> WeatherSnapshot {
        for attempt in &self.attempts {
            match attempt {
                ProviderAttempt::Tomorrow => {
                    let Some(client) = &self.tomorrow else {
                        continue;
                    };
                    match client.fetch_snapshot(force_refresh).await {
                        Ok(snapshot) => return snapshot,
                        Err(err) => {
                            tracing::warn!("Tomorrow.io failed, falling back to mock: {}", err);
                        }
                    }
                }
                ProviderAttempt::Mock => return self.mock.fetch_snapshot(force_refresh).await,
            }
        }
        // Chains always terminate in Mock; this path exists only for safety.
        self.mock.fetch_snapshot(force_refresh).await
    }
}
