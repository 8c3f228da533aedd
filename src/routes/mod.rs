//! HTTP surface: report dispatch, geocode enrichment, operational probes

pub mod geocode;
pub mod health;
pub mod metrics;
pub mod reports;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::RawParams;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Check the shared-secret key before anything else touches the request.
/// Runs ahead of the report timer, so rejected requests report zero elapsed
/// time.
pub(crate) fn authorize(params: &RawParams, config: &AppConfig) -> Result<(), ApiError> {
    match params.get("key") {
        Some(key) if *key == config.api_key => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health and metrics (Kubernetes probes + Prometheus)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Catalog-driven reports
        .merge(reports::router())
        // Geocode enrichment workflow
        .route("/geocode", get(geocode::geocode))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
