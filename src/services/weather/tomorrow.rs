//! Tomorrow.io v4 timelines client.
//!
//! Issues a timed-window query (now → now + 1 h) for a fixed field set at
//! the configured coordinates, and normalizes the first interval of the
//! response into the app's `WeatherSnapshot` shape.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::cache::SlotCache;
use crate::errors::AppError;
use crate::models::WeatherSnapshot;

const TIMELINE_URL: &str = "https://api.tomorrow.io/v4/timelines";

/// Per-call timeout for Tomorrow.io requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fields requested from the timeline endpoint.
const TIMELINE_FIELDS: &[&str] = &[
    "precipitationIntensity",
    "precipitationType",
    "windSpeed",
    "windGust",
    "windDirection",
    "temperature",
    "temperatureApparent",
    "cloudCover",
    "cloudBase",
    "cloudCeiling",
    "weatherCode",
    "visibility",
    "humidity",
];

/// Visibility assumed when the payload omits the field (km).
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

// --- Tomorrow.io JSON response types ---

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    data: TimelineData,
}

#[derive(Debug, Deserialize)]
struct TimelineData {
    timelines: Vec<Timeline>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    intervals: Vec<TimelineInterval>,
}

#[derive(Debug, Deserialize)]
struct TimelineInterval {
    values: TimelineValues,
}

/// Raw field values of one timeline interval — the provider-native format
/// cached by this adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineValues {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub weather_code: Option<u32>,
    pub visibility: Option<f64>,
}

/// Map a Tomorrow.io weather code to a condition string.
///
/// Unknown codes map to "Unknown" — never an error.
pub fn condition_from_code(code: u32) -> &'static str {
    match code {
        1000 => "Clear",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        1001 => "Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Whether the local hour falls in the static night window [18:00, 06:00).
///
/// TODO: the window is a fixed local-hour rule even though actual sun
/// positions are available from the celestial service; kept as-is because
/// changing it would alter `is_good_for_observation` for existing
/// consumers. Revisit together with the dashboard team.
pub fn is_night(local_hour: u32) -> bool {
    local_hour >= 18 || local_hour < 6
}

/// Fixed observation rule: night-time AND cloud cover < 30 % AND
/// visibility > 8 km AND wind speed < 4.2 m/s.
pub fn is_good_for_observation(
    local_hour: u32,
    cloud_cover_pct: f64,
    visibility_km: f64,
    wind_speed_ms: f64,
) -> bool {
    is_night(local_hour) && cloud_cover_pct < 30.0 && visibility_km > 8.0 && wind_speed_ms < 4.2
}

/// Convert raw interval values into the unified snapshot. Pure — time
/// inputs are passed in so tests can pin them.
pub fn normalize(
    values: &TimelineValues,
    observation_time: DateTime<Utc>,
    local_hour: u32,
) -> WeatherSnapshot {
    let visibility = values.visibility.unwrap_or(DEFAULT_VISIBILITY_KM);
    let cloud_cover = values.cloud_cover.unwrap_or(0.0);
    let wind_speed = values.wind_speed.unwrap_or(0.0);
    let condition = values
        .weather_code
        .map(condition_from_code)
        .unwrap_or("Unknown");

    WeatherSnapshot {
        condition: condition.to_string(),
        temperature: values.temperature.unwrap_or(0.0),
        humidity: values.humidity.unwrap_or(0.0).round() as i32,
        wind_speed,
        cloud_cover: cloud_cover.round() as i32,
        visibility,
        observation_time,
        is_good_for_observation: is_good_for_observation(
            local_hour,
            cloud_cover,
            visibility,
            wind_speed,
        ),
        source: "tomorrow".to_string(),
        sunrise_time: None,
        time_to_leave: None,
    }
}

/// Client for the Tomorrow.io timelines API, with its own raw-response
/// cache.
#[derive(Debug)]
pub struct TomorrowClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
    cache: SlotCache<TimelineValues>,
}

impl TomorrowClient {
    pub fn new(api_key: String, latitude: f64, longitude: f64, cache_validity: Duration) -> Self {
        Self::with_base_url(TIMELINE_URL, api_key, latitude, longitude, cache_validity)
    }

    pub(crate) fn with_base_url(
        base_url: &str,
        api_key: String,
        latitude: f64,
        longitude: f64,
        cache_validity: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            latitude,
            longitude,
            cache: SlotCache::new(cache_validity),
        }
    }

    /// Fetch the current-interval values, serving from the adapter cache
    /// when fresh. Fails fast with a configuration error when no API key
    /// is set — before any I/O.
    pub async fn fetch_current(&self, force_refresh: bool) -> Result<TimelineValues, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "Tomorrow.io API key is not configured".to_string(),
            ));
        }

        self.cache
            .get_or_refresh(force_refresh, || self.request_current())
            .await
    }

    /// Fetch and normalize in one step.
    pub async fn fetch_snapshot(&self, force_refresh: bool) -> Result<WeatherSnapshot, AppError> {
        use chrono::Timelike;
        let values = self.fetch_current(force_refresh).await?;
        let local_hour = chrono::Local::now().hour();
        Ok(normalize(&values, Utc::now(), local_hour))
    }

    async fn request_current(&self) -> Result<TimelineValues, AppError> {
        let now = Utc::now();
        let start_time = now.to_rfc3339();
        let end_time = (now + ChronoDuration::hours(1)).to_rfc3339();
        let location = format!("{},{}", self.latitude, self.longitude);
        let fields = TIMELINE_FIELDS.join(",");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("location", location.as_str()),
                ("fields", fields.as_str()),
                ("units", "metric"),
                ("timesteps", "current"),
                ("startTime", start_time.as_str()),
                ("endTime", end_time.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Tomorrow.io request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Tomorrow.io returned HTTP {}",
                response.status()
            )));
        }

        let timeline: TimelineResponse = response.json().await.map_err(|e| {
            AppError::MalformedResponse(format!("Tomorrow.io JSON error: {}", e))
        })?;

        timeline
            .data
            .timelines
            .into_iter()
            .next()
            .and_then(|t| t.intervals.into_iter().next())
            .map(|i| i.values)
            .ok_or_else(|| {
                AppError::MalformedResponse("Tomorrow.io returned an empty timeline".to_string())
            })
    }
}
