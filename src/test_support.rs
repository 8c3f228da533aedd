//! Shared fixtures and helpers for handler tests

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::db::Database;
use crate::models::Incident;
use crate::services::geocoder::ReverseGeocoder;
use crate::state::AppState;

pub const TEST_KEY: &str = "test-secret";

pub fn config(geocoder_base_url: &str) -> AppConfig {
    AppConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        api_key: TEST_KEY.to_string(),
        geocoder_base_url: geocoder_base_url.to_string(),
        geocoder_timeout: Duration::from_secs(2),
    }
}

pub fn incident(
    city: &str,
    category: &str,
    sub: &str,
    date: &str,
    lat: f64,
    lon: f64,
) -> Incident {
    let crime_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    Incident {
        city: city.to_string(),
        crime_category: category.to_string(),
        sub_category: sub.to_string(),
        crime_date,
        date_year: crime_date.year(),
        date_month: crime_date.month(),
        latitude: lat,
        longitude: lon,
    }
}

/// Incidents covering the three supported cities across years, categories
/// and weekdays. 2020-01-05, 2020-03-08 and 2021-06-20 are Sundays.
pub fn fixture_incidents() -> Vec<Incident> {
    vec![
        incident("Seattle", "Theft", "Shoplifting", "2020-01-05", 47.6097, -122.3331),
        incident("Seattle", "Theft", "Shoplifting", "2020-03-08", 47.6105, -122.3344),
        incident("Seattle", "Theft", "Burglary", "2020-02-10", 47.6205, -122.3493),
        incident("Seattle", "Assault", "Simple Assault", "2021-03-15", 47.6152, -122.3302),
        incident("Seattle", "Theft", "Driver's License Fraud", "2021-06-20", 47.6010, -122.3320),
        incident("Chicago", "Assault", "Aggravated Assault", "2020-01-05", 41.8781, -87.6298),
        incident("Chicago", "Theft", "Pickpocketing", "2021-07-21", 41.8840, -87.6320),
        incident("San Francisco", "Fraud", "Check Fraud", "2022-11-02", 37.7749, -122.4194),
    ]
}

pub async fn seeded_db() -> Database {
    let db = Database::in_memory().await;
    for row in fixture_incidents() {
        db.insert_incident(&row).await.unwrap();
    }
    db
}

pub async fn app_with(db: Database, geocoder_base_url: &str) -> Router {
    let config = config(geocoder_base_url);
    let geocoder = ReverseGeocoder::new(&config.geocoder_base_url, config.geocoder_timeout)
        .expect("geocoder client");
    crate::routes::app(AppState::new(config, db, geocoder))
}

/// App over the standard fixtures, with an upstream nothing listens on.
/// Tests that exercise the geocoder spawn their own stub instead.
pub async fn seeded_app() -> Router {
    app_with(seeded_db().await, "http://127.0.0.1:9").await
}

/// Issue a GET and return the status plus the parsed JSON body.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        panic!("non-JSON body for {uri}: {}", String::from_utf8_lossy(&bytes))
    });
    (status, body)
}
