//! Application state shared across handlers

use crate::config::AppConfig;
use crate::db::Database;
use crate::routes::metrics::Metrics;
use crate::services::geocoder::ReverseGeocoder;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration
    pub config: Arc<AppConfig>,
    /// Store connection pool
    pub db: Arc<Database>,
    /// Reverse geocoding client
    pub geocoder: Arc<ReverseGeocoder>,
    /// Application metrics for Prometheus
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, db: Database, geocoder: ReverseGeocoder) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            geocoder: Arc::new(geocoder),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
