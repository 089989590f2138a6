// Skywatch API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod cache;
mod config;
mod errors;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::celestial::CelestialClient;
use services::positions::PositionAggregator;
use services::weather::mock::MockWeather;
use services::weather::tomorrow::TomorrowClient;
use services::weather::{UnifiedWeatherService, WeatherProviderKind};

/// Skywatch API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skywatch API",
        version = "0.1.0",
        description = "Data aggregation and caching API for a sky-visibility dashboard. \
            Merges precomputed celestial positions with realtime overrides, and unifies \
            weather observations from interchangeable providers with a mock fallback.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Positions", description = "Merged celestial position data"),
        (name = "Weather", description = "Unified weather observations"),
    ),
    paths(
        routes::health::health_check,
        routes::positions::get_positions,
        routes::weather::get_weather,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            models::PositionSample,
            models::BaseData,
            models::Visibility,
            models::CelestialObject,
            models::WeatherSnapshot,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skywatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let celestial = CelestialClient::new(&config.celestial_service_url);

    let provider = WeatherProviderKind::parse(&config.weather_provider);
    let tomorrow = config.tomorrow_api_key.as_ref().map(|key| {
        TomorrowClient::new(
            key.clone(),
            config.default_latitude,
            config.default_longitude,
            config.tomorrow_cache_validity,
        )
    });

    // One aggregator (and one cache slot) per process, owned here and
    // injected — no module-level singletons.
    let app_state = AppState {
        positions: Arc::new(PositionAggregator::new(
            celestial.clone(),
            config.positions_cache_validity,
        )),
        weather: Arc::new(UnifiedWeatherService::new(
            provider,
            tomorrow,
            MockWeather::new(config.weather_cache_validity),
            celestial,
            config.weather_cache_validity,
        )),
        provider,
    };

    tracing::info!(
        "Weather provider: {} (tomorrow key {})",
        provider.as_str(),
        if config.tomorrow_api_key.is_some() {
            "configured"
        } else {
            "absent"
        }
    );

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/positions", get(routes::positions::get_positions))
        .route("/api/v1/weather", get(routes::weather::get_weather))
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
