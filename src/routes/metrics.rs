//! Prometheus metrics endpoint

use axum::response::IntoResponse;
use std::sync::atomic::{AtomicU64, Ordering};

/// Application metrics for Prometheus
#[derive(Default)]
pub struct Metrics {
    /// Total requests processed
    pub requests_total: AtomicU64,
    /// Total report requests that ended in a failure envelope
    pub report_failures_total: AtomicU64,
    /// Total geocode enrichment requests
    pub geocode_requests_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_report_failures(&self) {
        self.report_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_geocode_requests(&self) {
        self.geocode_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            report_failures_total: self.report_failures_total.load(Ordering::Relaxed),
            geocode_requests_total: self.geocode_requests_total.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub report_failures_total: u64,
    pub geocode_requests_total: u64,
}

/// GET /metrics
///
/// Returns Prometheus-format metrics
pub async fn prometheus_metrics(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> impl IntoResponse {
    let snapshot = state.metrics.get_metrics();

    let output = format!(
        r#"# HELP crimescope_requests_total Total number of HTTP requests processed
# TYPE crimescope_requests_total counter
crimescope_requests_total {}

# HELP crimescope_report_failures_total Total number of report requests answered with a failure envelope
# TYPE crimescope_report_failures_total counter
crimescope_report_failures_total {}

# HELP crimescope_geocode_requests_total Total number of geocode enrichment requests
# TYPE crimescope_geocode_requests_total counter
crimescope_geocode_requests_total {}

# HELP crimescope_info Build information
# TYPE crimescope_info gauge
crimescope_info{{version="{}"}} 1
"#,
        snapshot.requests_total,
        snapshot.report_failures_total,
        snapshot.geocode_requests_total,
        env!("CARGO_PKG_VERSION"),
    );

    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        output,
    )
}
