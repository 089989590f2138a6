//! Canonical wire types shared by the aggregators and the HTTP layer.
//!
//! Positions are produced by the external celestial service and passed
//! through as-is after merging; weather is normalized into a single
//! `WeatherSnapshot` shape regardless of which provider produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single position sample on an object's daily path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionSample {
    /// Sample time (RFC 3339, UTC)
    pub time: DateTime<Utc>,
    /// Altitude above the horizon in degrees, [-90, 90]
    pub altitude: f64,
    /// Azimuth in degrees, [0, 360)
    pub azimuth: f64,
}

/// Static catalog data for an object. All fields optional — the Sun, for
/// example, carries neither a magnitude nor a constellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BaseData {
    pub magnitude: Option<f64>,
    pub constellation: Option<String>,
}

/// Current visibility status as reported by the celestial service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Visibility {
    #[serde(rename = "isVisible")]
    pub is_visible: bool,
    /// Human-readable status, e.g. "Visible at 42.0° altitude"
    pub message: String,
    /// Next rise time, if the object is currently below the horizon
    #[serde(default)]
    pub next_rise: Option<DateTime<Utc>>,
    /// Next set time, if the object is currently above the horizon
    #[serde(default)]
    pub next_set: Option<DateTime<Utc>>,
}

/// A celestial object with its precomputed daily path.
///
/// Invariant: `daily_path` is ordered ascending by `time`. The realtime
/// merge binary-searches on that ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CelestialObject {
    /// Identifier, unique within a snapshot (e.g. "Mars", "Moon")
    pub name: String,
    /// Object category: "planet", "moon", "sun", "star", ...
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub base_data: Option<BaseData>,
    pub visibility: Visibility,
    pub daily_path: Vec<PositionSample>,
}

/// Weather observation in the app's unified shape, independent of provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherSnapshot {
    /// Condition string, e.g. "Clear", "Mostly Cloudy", "Unknown"
    pub condition: String,
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: i32,
    /// Wind speed in metres per second
    pub wind_speed: f64,
    /// Cloud cover percentage
    pub cloud_cover: i32,
    /// Visibility in kilometres
    pub visibility: f64,
    /// When this observation was taken (RFC 3339, UTC)
    pub observation_time: DateTime<Utc>,
    /// Whether conditions favour sky observation (night, clear, calm)
    pub is_good_for_observation: bool,
    /// Configured provider name ("tomorrow", "openweathermap", "mock").
    /// Reflects configuration, not necessarily the backend that served
    /// this snapshot — a fallback to mock keeps the configured name.
    pub source: String,
    /// Next sunrise, from the celestial service enrichment call
    pub sunrise_time: Option<DateTime<Utc>>,
    /// Recommended pack-up time before sunrise, from the same call
    pub time_to_leave: Option<DateTime<Utc>>,
}

/// Payload of the celestial service's sunrise endpoint, used to enrich
/// weather snapshots. Both fields are best-effort.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SunTimes {
    #[serde(default)]
    pub sunrise_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_to_leave: Option<DateTime<Utc>>,
}
