//! Reverse geocoding client for Nominatim-compatible endpoints
//!
//! Turns a coordinate pair into a structured address via the upstream
//! `/reverse` endpoint. The upstream is optional infrastructure: every
//! failure mode (timeout, refused connection, error status, quota page
//! without an address) surfaces as [`ApiError::GeocodeUnavailable`] so the
//! caller degrades instead of hanging.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// HTTP client for a Nominatim-compatible reverse geocoding service.
#[derive(Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    /// Build a client with a bounded request timeout. Public Nominatim
    /// requires an identifying User-Agent, so one is always set.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crimescope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a coordinate pair to a structured address object.
    pub async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<serde_json::Map<String, Value>, ApiError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(latitude, longitude, %url, "reverse geocoding lookup");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body: Value = response.json().await.map_err(transport_error)?;
        parse_reverse_response(status, &body)
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    };
    debug!(error = %err, "reverse geocoding transport failure");
    ApiError::GeocodeUnavailable(detail)
}

/// Interpret an upstream reply. Nominatim answers quota and error cases
/// with 200 plus a body lacking the `address` object, so both the status
/// and the shape are checked.
fn parse_reverse_response(
    status: StatusCode,
    body: &Value,
) -> Result<serde_json::Map<String, Value>, ApiError> {
    if !status.is_success() {
        return Err(ApiError::GeocodeUnavailable(format!(
            "upstream returned status {}",
            status.as_u16()
        )));
    }
    match body.get("address").and_then(Value::as_object) {
        Some(address) => Ok(address.clone()),
        None => Err(ApiError::GeocodeUnavailable(
            "address not found or quota exceeded".to_string(),
        )),
    }
}
