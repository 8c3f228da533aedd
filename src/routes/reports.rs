//! Catalog-driven report endpoints
//!
//! One route per catalog definition, all sharing a single pipeline:
//! authorize, start the timer, validate parameters, execute, wrap in the
//! envelope. Adding a report means adding a catalog entry, not a handler.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{debug, warn};

use crate::catalog::{self, RawParams, ReportDefinition};
use crate::error::{ApiError, Failure};
use crate::models::{Envelope, ReportRow};
use crate::routes::authorize;
use crate::state::AppState;

/// Build one route per registered report definition.
pub fn router() -> Router<AppState> {
    catalog::all().iter().fold(Router::new(), |router, def| {
        router.route(
            def.path,
            get(move |state: State<AppState>, params: Query<RawParams>| {
                run_report(def, state, params)
            }),
        )
    })
}

/// Shared pipeline for every report endpoint. The timer starts after the
/// key check, so it measures validation and store work only.
async fn run_report(
    def: &'static ReportDefinition,
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> Response {
    state.metrics.inc_requests();

    if let Err(err) = authorize(&params, &state.config) {
        warn!(report = def.name, "rejected request with bad or missing key");
        state.metrics.inc_report_failures();
        return Failure::immediate(def.name, err).into_response();
    }

    let started = Instant::now();
    match execute(def, &state, &params).await {
        Ok(rows) => {
            let elapsed = started.elapsed().as_secs_f64();
            debug!(report = def.name, rows = rows.len(), elapsed, "report served");
            Json(Envelope::ok(def.name, rows, elapsed)).into_response()
        }
        Err(err) => {
            let elapsed = started.elapsed().as_secs_f64();
            warn!(report = def.name, error = %err, "report failed");
            state.metrics.inc_report_failures();
            Failure::new(def.name, err, elapsed).into_response()
        }
    }
}

async fn execute(
    def: &ReportDefinition,
    state: &AppState,
    params: &RawParams,
) -> Result<Vec<ReportRow>, ApiError> {
    let bound = catalog::validate(def, params)?;
    state.db.run_report(def, &bound).await
}
