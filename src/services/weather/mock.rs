//! Mock weather generator — the universal fallback provider.
//!
//! Synthesizes a plausible snapshot pseudo-randomly. Infallible by
//! construction: every other provider in the fallback chain may fail, this
//! one cannot.

use chrono::{Timelike, Utc};
use rand::Rng;
use std::time::Duration;

use crate::cache::SlotCache;
use crate::models::WeatherSnapshot;
use crate::services::weather::tomorrow::is_good_for_observation;

/// Conditions the generator draws from, with a clear-sky bias and the
/// cloud-cover range coupled to each condition.
const CONDITIONS: &[(&str, u32, (i32, i32))] = &[
    ("Clear", 30, (0, 10)),
    ("Mostly Clear", 20, (10, 30)),
    ("Partly Cloudy", 18, (30, 60)),
    ("Cloudy", 14, (60, 100)),
    ("Rain", 8, (70, 100)),
    ("Snow", 5, (70, 100)),
    ("Fog", 5, (80, 100)),
];

/// Generate one plausible snapshot. Pure given the rng and hour, so tests
/// can pin both.
pub fn generate(rng: &mut impl Rng, local_hour: u32) -> WeatherSnapshot {
    let total_weight: u32 = CONDITIONS.iter().map(|(_, w, _)| w).sum();
    let mut pick = rng.gen_range(0..total_weight);
    let mut chosen = CONDITIONS[0];
    for entry in CONDITIONS {
        if pick < entry.1 {
            chosen = *entry;
            break;
        }
        pick -= entry.1;
    }
    let (condition, _, (cloud_lo, cloud_hi)) = chosen;

    let cloud_cover = rng.gen_range(cloud_lo..=cloud_hi);
    let visibility = match condition {
        "Fog" => rng.gen_range(0.5..2.0),
        "Rain" | "Snow" => rng.gen_range(2.0..8.0),
        _ => rng.gen_range(8.0..20.0),
    };
    let wind_speed = rng.gen_range(0.0..8.0);
    let temperature = rng.gen_range(-5.0..25.0);
    let humidity = rng.gen_range(30..=90);

    WeatherSnapshot {
        condition: condition.to_string(),
        temperature,
        humidity,
        wind_speed,
        cloud_cover,
        visibility,
        observation_time: Utc::now(),
        is_good_for_observation: is_good_for_observation(
            local_hour,
            cloud_cover as f64,
            visibility,
            wind_speed,
        ),
        source: "mock".to_string(),
        sunrise_time: None,
        time_to_leave: None,
    }
}

/// Mock provider with its own cache slot, like the real adapters.
#[derive(Debug)]
pub struct MockWeather {
    cache: SlotCache<WeatherSnapshot>,
}

impl MockWeather {
    pub fn new(cache_validity: Duration) -> Self {
        Self {
            cache: SlotCache::new(cache_validity),
        }
    }

    /// Return a snapshot, generating a new one when the slot is cold,
    /// expired, or a refresh is forced. Cannot fail.
    pub async fn fetch_snapshot(&self, force_refresh: bool) -> WeatherSnapshot {
        if !force_refresh {
            if let Some(cached) = self.cache.get().await {
                return cached;
            }
        }
        let snapshot = generate(&mut rand::thread_rng(), chrono::Local::now().hour());
        self.cache.put(snapshot.clone()).await;
        snapshot
    }
}
