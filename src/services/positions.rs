//! Position aggregation: combined feed first, daily + realtime fallback
//! pair second, merged by timestamp into one canonical object map.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::SlotCache;
use crate::errors::AppError;
use crate::models::{CelestialObject, PositionSample};
use crate::services::celestial::CelestialClient;

/// Owns the positions cache and the fetch/fallback/merge policy.
#[derive(Debug)]
pub struct PositionAggregator {
    client: CelestialClient,
    cache: SlotCache<HashMap<String, CelestialObject>>,
}

impl PositionAggregator {
    pub fn new(client: CelestialClient, cache_validity: Duration) -> Self {
        Self {
            client,
            cache: SlotCache::new(cache_validity),
        }
    }

    /// Fetch the merged object map, serving from cache when fresh.
    ///
    /// Resolution order:
    /// 1. fresh cache (unless `force_refresh`)
    /// 2. combined-positions feed
    /// 3. daily + realtime pair, fetched concurrently and merged
    ///
    /// If both the combined call and the fallback pair fail, the fallback
    /// error propagates — position failures are surfaced, never masked.
    pub async fn fetch_positions(
        &self,
        force_refresh: bool,
    ) -> Result<HashMap<String, CelestialObject>, AppError> {
        self.cache
            .get_or_refresh(force_refresh, || self.refresh())
            .await
    }

    async fn refresh(&self) -> Result<HashMap<String, CelestialObject>, AppError> {
        match self.client.fetch_combined().await {
            Ok(objects) => {
                tracing::debug!("combined-positions served {} objects", objects.len());
                Ok(objects)
            }
            Err(err) => {
                tracing::warn!(
                    "combined-positions unavailable, falling back to daily + realtime: {}",
                    err
                );
                let (mut daily, realtime) =
                    futures::try_join!(self.client.fetch_daily(), self.client.fetch_realtime())?;
                merge_realtime(&mut daily, realtime, Utc::now());
                Ok(daily)
            }
        }
    }
}

/// Overwrite each object's current path slot with its realtime sample.
///
/// For every realtime `(name, sample)`: binary-search the object's
/// ascending `daily_path` for the first element strictly after `now` and
/// replace that single element in place. Objects absent from the daily
/// feed, and paths with no future element, drop the sample — a deliberate
/// no-op, not an error.
pub fn merge_realtime(
    daily: &mut HashMap<String, CelestialObject>,
    realtime: HashMap<String, PositionSample>,
    now: DateTime<Utc>,
) {
    for (name, sample) in realtime {
        let Some(object) = daily.get_mut(&name) else {
            continue;
        };
        let idx = object.daily_path.partition_point(|p| p.time <= now);
        if idx < object.daily_path.len() {
            object.daily_path[idx] = sample;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn sample(time: &str, altitude: f64, azimuth: f64) -> PositionSample {
        PositionSample {
            time: ts(time),
            altitude,
            azimuth,
        }
    }

    fn object(name: &str, path_samples: Vec<PositionSample>) -> CelestialObject {
        CelestialObject {
            name: name.to_string(),
            object_type: "planet".to_string(),
            base_data: None,
            visibility: Visibility {
                is_visible: true,
                message: "Visible".to_string(),
                next_rise: None,
                next_set: None,
            },
            daily_path: path_samples,
        }
    }

    #[test]
    fn test_merge_replaces_first_future_slot() {
        // Path 10:00, 10:10, 10:20; now = 10:05; realtime at 10:05.
        // The 10:10 slot is replaced — nothing is inserted.
        let mut daily = HashMap::from([(
            "Mars".to_string(),
            object(
                "Mars",
                vec![
                    sample("2026-03-01T10:00:00Z", 28.0, 118.0),
                    sample("2026-03-01T10:10:00Z", 29.0, 119.0),
                    sample("2026-03-01T10:20:00Z", 31.0, 121.0),
                ],
            ),
        )]);
        let realtime = HashMap::from([(
            "Mars".to_string(),
            sample("2026-03-01T10:05:00Z", 30.0, 120.0),
        )]);

        merge_realtime(&mut daily, realtime, ts("2026-03-01T10:05:00Z"));

        let merged = &daily["Mars"].daily_path;
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], sample("2026-03-01T10:00:00Z", 28.0, 118.0));
        assert_eq!(merged[1], sample("2026-03-01T10:05:00Z", 30.0, 120.0));
        assert_eq!(merged[2], sample("2026-03-01T10:20:00Z", 31.0, 121.0));
    }

    #[test]
    fn test_merge_exactly_one_element_changes() {
        let original: Vec<PositionSample> = (0..8)
            .map(|i| sample(&format!("2026-03-01T{:02}:00:00Z", 10 + i), i as f64, 90.0))
            .collect();
        let mut daily = HashMap::from([("Moon".to_string(), object("Moon", original.clone()))]);
        let realtime = HashMap::from([(
            "Moon".to_string(),
            sample("2026-03-01T13:30:00Z", 99.0, 99.0),
        )]);

        merge_realtime(&mut daily, realtime, ts("2026-03-01T13:30:00Z"));

        let merged = &daily["Moon"].daily_path;
        let changed: Vec<usize> = (0..original.len())
            .filter(|&i| merged[i] != original[i])
            .collect();
        // Earliest element with time > 13:30 is the 14:00 slot (index 4)
        assert_eq!(changed, vec![4]);
        assert_eq!(merged[4], sample("2026-03-01T13:30:00Z", 99.0, 99.0));
    }

    #[test]
    fn test_merge_noop_when_all_samples_in_past() {
        let original = vec![
            sample("2026-03-01T08:00:00Z", 10.0, 90.0),
            sample("2026-03-01T09:00:00Z", 12.0, 95.0),
        ];
        let mut daily = HashMap::from([("Mars".to_string(), object("Mars", original.clone()))]);
        let realtime = HashMap::from([(
            "Mars".to_string(),
            sample("2026-03-01T12:00:00Z", 50.0, 180.0),
        )]);

        merge_realtime(&mut daily, realtime, ts("2026-03-01T12:00:00Z"));

        assert_eq!(daily["Mars"].daily_path, original);
    }

    #[test]
    fn test_merge_noop_when_object_absent_from_daily_feed() {
        let mut daily = HashMap::from([(
            "Mars".to_string(),
            object("Mars", vec![sample("2026-03-01T10:00:00Z", 10.0, 90.0)]),
        )]);
        let realtime = HashMap::from([(
            "Phobos".to_string(),
            sample("2026-03-01T09:00:00Z", 1.0, 1.0),
        )]);

        merge_realtime(&mut daily, realtime, ts("2026-03-01T08:00:00Z"));

        assert_eq!(daily.len(), 1);
        assert_eq!(daily["Mars"].daily_path.len(), 1);
    }

    #[test]
    fn test_merge_empty_path_is_noop() {
        let mut daily = HashMap::from([("Sun".to_string(), object("Sun", vec![]))]);
        let realtime = HashMap::from([(
            "Sun".to_string(),
            sample("2026-03-01T09:00:00Z", 1.0, 1.0),
        )]);

        merge_realtime(&mut daily, realtime, ts("2026-03-01T08:00:00Z"));
        assert!(daily["Sun"].daily_path.is_empty());
    }

    // --- fetch_positions integration (wiremock) ---

    fn daily_json(times: &[&str]) -> serde_json::Value {
        let path: Vec<serde_json::Value> = times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                serde_json::json!({ "time": t, "altitude": 10.0 + i as f64, "azimuth": 100.0 })
            })
            .collect();
        serde_json::json!({
            "Mars": {
                "name": "Mars",
                "type": "planet",
                "visibility": { "isVisible": true, "message": "Visible" },
                "daily_path": path
            }
        })
    }

    #[tokio::test]
    async fn test_combined_endpoint_preferred() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/combined-positions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(daily_json(&["2300-01-01T00:00:00Z"])),
            )
            .expect(1)
            .mount(&server)
            .await;
        // The fallback pair must not be touched when combined succeeds
        Mock::given(method("GET"))
            .and(path("/daily_positions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let aggregator = PositionAggregator::new(
            CelestialClient::new(&server.uri()),
            Duration::from_secs(60),
        );
        let objects = aggregator.fetch_positions(false).await.unwrap();
        assert!(objects.contains_key("Mars"));
    }

    #[tokio::test]
    async fn test_combined_404_falls_back_to_pair_and_merges() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/combined-positions"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        // Path entirely in the future relative to the wall clock, so the
        // realtime sample always lands in the first slot.
        Mock::given(method("GET"))
            .and(path("/daily_positions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_json(&[
                "2300-01-01T00:00:00Z",
                "2300-01-01T00:15:00Z",
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/realtime-positions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Mars": { "time": "2299-12-31T23:59:00Z", "altitude": 77.0, "azimuth": 200.0 }
            })))
            .mount(&server)
            .await;

        let aggregator = PositionAggregator::new(
            CelestialClient::new(&server.uri()),
            Duration::from_secs(60),
        );
        let objects = aggregator.fetch_positions(false).await.unwrap();

        let mars_path = &objects["Mars"].daily_path;
        assert_eq!(mars_path.len(), 2);
        assert_eq!(mars_path[0].altitude, 77.0);
        assert_eq!(mars_path[1].altitude, 11.0);
    }

    #[tokio::test]
    async fn test_fresh_cache_issues_zero_upstream_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/combined-positions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(daily_json(&["2300-01-01T00:00:00Z"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let aggregator = PositionAggregator::new(
            CelestialClient::new(&server.uri()),
            Duration::from_secs(60),
        );
        let first = aggregator.fetch_positions(false).await.unwrap();
        let second = aggregator.fetch_positions(false).await.unwrap();
        assert_eq!(first, second);
        // Mock .expect(1) verifies exactly one upstream call on drop
    }

    #[tokio::test]
    async fn test_total_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/combined-positions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/daily_positions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/realtime-positions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let aggregator = PositionAggregator::new(
            CelestialClient::new(&server.uri()),
            Duration::from_secs(60),
        );
        let err = aggregator.fetch_positions(false).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)), "{:?}", err);
    }
}
