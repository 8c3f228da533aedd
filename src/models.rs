//! Core domain models for crimescope

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One result row of a report: column name to value, in declared column
/// order. Rows are value data copied out of the store.
pub type ReportRow = serde_json::Map<String, Value>;

/// The uniform wrapper around every response body.
///
/// Wire field names are the caller contract:
/// `{success, message, reportName, data, elapsedSeconds}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the request produced data.
    pub success: bool,
    /// "Success", or the terminal error's message.
    pub message: String,
    /// Name of the originating report, populated on every outcome.
    pub report_name: String,
    /// Result payload; `null` on failure.
    pub data: Option<T>,
    /// Seconds from the start of parameter validation to completion of the
    /// store/collaborator work. `0.0` when authorization failed first.
    pub elapsed_seconds: f64,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(report: &str, data: T, elapsed: f64) -> Self {
        Self {
            success: true,
            message: "Success".to_string(),
            report_name: report.to_string(),
            data: Some(data),
            elapsed_seconds: elapsed,
        }
    }
}

impl Envelope<Value> {
    pub fn failed(report: &str, message: String, elapsed: f64) -> Self {
        Self {
            success: false,
            message,
            report_name: report.to_string(),
            data: None,
            elapsed_seconds: elapsed,
        }
    }
}

/// A record of the incident dataset.
///
/// The serving path only ever reads these; the struct exists for fixtures
/// and dataset loading (`Database::insert_incident`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub city: String,
    pub crime_category: String,
    pub sub_category: String,
    pub crime_date: NaiveDate,
    pub date_year: i32,
    pub date_month: u32,
    /// WGS84 coordinates; `0.0` is the dataset's "unknown" sentinel.
    pub latitude: f64,
    pub longitude: f64,
}

/// Successful result of the geocode enrichment workflow: the looked-up
/// coordinates merged with the collaborator's address breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct GeocodePayload {
    pub latitude: f64,
    pub longitude: f64,
    /// Address components as returned by the reverse geocoder
    /// (road, city, state, ...).
    pub address: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_legacy_wire_names() {
        let envelope = Envelope::ok("crime_over_years", vec![ReportRow::new()], 0.25);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], Value::Bool(true));
        assert_eq!(json["message"], "Success");
        assert_eq!(json["reportName"], "crime_over_years");
        assert!(json["data"].is_array());
        assert_eq!(json["elapsedSeconds"], 0.25);
    }

    #[test]
    fn failed_envelope_keeps_report_and_timing() {
        let envelope = Envelope::failed("geocode", "Invalid API key".to_string(), 0.0);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], Value::Bool(false));
        assert_eq!(json["reportName"], "geocode");
        assert_eq!(json["data"], Value::Null);
        assert_eq!(json["elapsedSeconds"], 0.0);
    }
}
