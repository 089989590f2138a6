use std::time::Duration;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the celestial position service.
    pub celestial_service_url: String,
    /// Active weather provider name ("tomorrow", "openweathermap", "mock").
    pub weather_provider: String,
    /// Tomorrow.io API key. Absent key means the provider chain starts at mock.
    pub tomorrow_api_key: Option<String>,
    /// Observer latitude used for weather queries.
    pub default_latitude: f64,
    /// Observer longitude used for weather queries.
    pub default_longitude: f64,
    /// Validity window for the merged positions cache.
    pub positions_cache_validity: Duration,
    /// Validity window for the unified weather cache.
    pub weather_cache_validity: Duration,
    /// Validity window for the Tomorrow.io adapter's raw-response cache.
    pub tomorrow_cache_validity: Duration,
    pub port: u16,
}

fn env_secs(var: &str, default_secs: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

fn env_f64(var: &str, default: f64) -> f64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            celestial_service_url: std::env::var("CELESTIAL_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            weather_provider: std::env::var("WEATHER_PROVIDER")
                .unwrap_or_else(|_| "tomorrow".to_string()),
            tomorrow_api_key: std::env::var("TOMORROW_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            default_latitude: env_f64("DEFAULT_LATITUDE", 43.397221),
            default_longitude: env_f64("DEFAULT_LONGITUDE", -80.311386),
            positions_cache_validity: env_secs("POSITIONS_CACHE_SECS", 60),
            weather_cache_validity: env_secs("WEATHER_CACHE_SECS", 300),
            tomorrow_cache_validity: env_secs("TOMORROW_CACHE_SECS", 300),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // NOTE: set_var/remove_var in tests is unsafe in multi-threaded contexts
        // (Rust may run tests in parallel). This test only exercises the
        // default-value logic; we accept the risk since this module's tests
        // run within one test binary.
        unsafe {
            std::env::remove_var("CELESTIAL_SERVICE_URL");
            std::env::remove_var("WEATHER_PROVIDER");
            std::env::remove_var("TOMORROW_API_KEY");
            std::env::remove_var("DEFAULT_LATITUDE");
            std::env::remove_var("DEFAULT_LONGITUDE");
            std::env::remove_var("POSITIONS_CACHE_SECS");
            std::env::remove_var("WEATHER_CACHE_SECS");
            std::env::remove_var("TOMORROW_CACHE_SECS");
            std::env::remove_var("PORT");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.celestial_service_url, "http://localhost:8000");
        assert_eq!(config.weather_provider, "tomorrow");
        assert!(config.tomorrow_api_key.is_none());
        assert!((config.default_latitude - 43.397221).abs() < 1e-9);
        assert_eq!(config.positions_cache_validity, Duration::from_secs(60));
        assert_eq!(config.weather_cache_validity, Duration::from_secs(300));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_empty_api_key_treated_as_absent() {
        unsafe {
            std::env::set_var("TOMORROW_API_KEY", "");
        }
        let config = AppConfig::from_env();
        assert!(config.tomorrow_api_key.is_none());
        unsafe {
            std::env::remove_var("TOMORROW_API_KEY");
        }
    }
}
