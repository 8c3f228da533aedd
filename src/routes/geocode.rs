//! Geocode enrichment workflow
//!
//! Composes three lookups in order: the distinct cities present in the
//! store (request gate), the first coordinate pair matching the city and
//! sub-category filter, and the external reverse-geocoding call. The first
//! failing stage terminates the request; no stage is retried.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::catalog::{self, RawParams};
use crate::error::{ApiError, Failure};
use crate::models::{Envelope, GeocodePayload};
use crate::routes::authorize;
use crate::state::AppState;

const REPORT: &str = "geocode";

/// GET /geocode
///
/// Resolves a city + sub-category filter to the first matching incident's
/// coordinates and enriches them with a structured address.
pub async fn geocode(State(state): State<AppState>, Query(params): Query<RawParams>) -> Response {
    state.metrics.inc_requests();
    state.metrics.inc_geocode_requests();

    if let Err(err) = authorize(&params, &state.config) {
        warn!(report = REPORT, "rejected request with bad or missing key");
        return Failure::immediate(REPORT, err).into_response();
    }

    let started = Instant::now();
    match enrich(&state, &params).await {
        Ok(payload) => {
            let elapsed = started.elapsed().as_secs_f64();
            debug!(
                latitude = payload.latitude,
                longitude = payload.longitude,
                elapsed,
                "geocode enrichment served"
            );
            Json(Envelope::ok(REPORT, payload, elapsed)).into_response()
        }
        Err(err) => {
            let elapsed = started.elapsed().as_secs_f64();
            warn!(error = %err, "geocode enrichment failed");
            Failure::new(REPORT, err, elapsed).into_response()
        }
    }
}

async fn enrich(state: &AppState, params: &RawParams) -> Result<GeocodePayload, ApiError> {
    let city = catalog::require(params, "city")?;
    let sub_category = catalog::require(params, "sub_category")?;

    // The city gate checks what the store actually holds, not the static
    // allow-list; the dataset and the list can drift.
    let cities = state.db.distinct_cities().await?;
    if !cities.iter().any(|candidate| candidate == city) {
        return Err(ApiError::UnknownCity {
            city: city.to_string(),
            available: cities,
        });
    }

    let (latitude, longitude) = state
        .db
        .first_location(city, sub_category)
        .await?
        .ok_or(ApiError::NoMatch)?;

    let address = state.geocoder.reverse(latitude, longitude).await?;

    Ok(GeocodePayload {
        latitude,
        longitude,
        address,
    })
}
