//! Request error taxonomy and HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::Envelope;

/// Everything that can terminate a request.
///
/// Each variant is terminal: nothing is retried, and one request's failure
/// never affects another. The `Display` text of a variant is exactly the
/// `message` callers see in the envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The `key` query parameter is absent or wrong.
    #[error("Invalid API key")]
    Unauthorized,

    /// A declared parameter is absent (or blank, which counts as absent).
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// An enum-constrained parameter is outside its allow-list.
    #[error("Invalid value for '{name}'. Valid options: {}", .allowed.join(", "))]
    InvalidEnumValue {
        name: &'static str,
        allowed: &'static [&'static str],
    },

    /// The requested city is not among the distinct cities in the store.
    /// Carries the live list so callers see what is actually available.
    #[error("City '{city}' not found in the dataset. Available cities are: {}", .available.join(", "))]
    UnknownCity { city: String, available: Vec<String> },

    /// No incident matched the city + sub-category lookup.
    #[error("No crimes found for the provided city and sub-category.")]
    NoMatch,

    /// The incident store failed. The detail is sanitized (see
    /// `From<sqlx::Error>`) and never carries connection credentials.
    #[error("Store error: {0}")]
    Store(String),

    /// The reverse-geocoding collaborator failed, answered with a
    /// non-success status, or returned a payload without an address.
    #[error("Reverse geocoding unavailable: {0}")]
    GeocodeUnavailable(String),
}

impl ApiError {
    /// HTTP status for this error class.
    ///
    /// One status per class, uniformly: the legacy service mixed bespoke
    /// `{"error": ...}` 400 bodies with 200-plus-flag responses. The single
    /// legacy behavior kept for compatibility is auth failure as 200 with
    /// `success=false`.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::OK,
            ApiError::MissingParameter(_)
            | ApiError::InvalidEnumValue { .. }
            | ApiError::UnknownCity { .. } => StatusCode::BAD_REQUEST,
            ApiError::NoMatch => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::GeocodeUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    /// Sanitize store failures before they can reach a response body.
    ///
    /// SQL-level messages (bad date literal, missing table) pass through;
    /// connection-level failures collapse to fixed text so DSNs, hostnames
    /// and credentials never leave the process.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => ApiError::Store(db.message().to_string()),
            sqlx::Error::RowNotFound => ApiError::Store("row not found".to_string()),
            sqlx::Error::ColumnNotFound(column) => {
                ApiError::Store(format!("column not found: {column}"))
            }
            sqlx::Error::ColumnDecode { index, .. } => {
                ApiError::Store(format!("could not decode column {index}"))
            }
            sqlx::Error::PoolTimedOut => {
                ApiError::Store("store connection pool timed out".to_string())
            }
            _ => ApiError::Store("store unavailable".to_string()),
        }
    }
}

/// A terminated request, carrying the context the envelope needs.
#[derive(Debug)]
pub struct Failure {
    pub report: &'static str,
    pub error: ApiError,
    pub elapsed: f64,
}

impl Failure {
    pub fn new(report: &'static str, error: ApiError, elapsed: f64) -> Self {
        Self {
            report,
            error,
            elapsed,
        }
    }

    /// Failure before timing started (authorization), reported as zero
    /// elapsed seconds.
    pub fn immediate(report: &'static str, error: ApiError) -> Self {
        Self::new(report, error, 0.0)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = Envelope::failed(self.report, self.error.to_string(), self.elapsed);
        (status, Json(body)).into_response()
    }
}
