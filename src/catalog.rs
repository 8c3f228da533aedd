//! Static registry of report definitions and parameter validation
//!
//! Every aggregation the gateway serves is declared here as data: its route,
//! the parameters it requires, the SQL template it binds them into, and the
//! columns its rows carry. Handlers dispatch over this table instead of
//! repeating the check-validate-execute-wrap flow per endpoint.
//!
//! Templates are fixed string constants. Per-request values, the substring
//! filters included, travel through `?` bind positions and never through the
//! query text itself.

use std::collections::HashMap;

use crate::error::ApiError;

/// Raw query parameters as received on the wire.
pub type RawParams = HashMap<String, String>;

/// The closed set of cities the static reports accept.
///
/// The geocode workflow does not use this list; it validates against the
/// distinct cities actually present in the store.
pub const SUPPORTED_CITIES: &[&str] = &["Seattle", "Chicago", "San Francisco"];

/// Declared parameter of a report, in template bind order.
#[derive(Debug, Clone, Copy)]
pub enum ParamSpec {
    /// Must be a member of the allow-list.
    Enum {
        name: &'static str,
        allowed: &'static [&'static str],
    },
    /// Opaque date string; presence-checked only, compared by the store.
    Date { name: &'static str },
    /// Untrusted free text, bound as a case-insensitive substring match.
    Substring { name: &'static str },
}

impl ParamSpec {
    pub fn name(&self) -> &'static str {
        match *self {
            ParamSpec::Enum { name, .. }
            | ParamSpec::Date { name }
            | ParamSpec::Substring { name } => name,
        }
    }
}

/// Decode type of a declared result column.
#[derive(Debug, Clone, Copy)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

/// A column of a report's result rows.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
    }
}

const fn integer(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Integer,
    }
}

const fn real(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Real,
    }
}

/// One named aggregation: route, parameters, template, result shape.
/// Immutable for the process lifetime.
#[derive(Debug)]
pub struct ReportDefinition {
    /// Route path, which doubles as the wire-visible report name.
    pub path: &'static str,
    /// Report name echoed in the envelope.
    pub name: &'static str,
    /// Required parameters, in template bind order.
    pub params: &'static [ParamSpec],
    /// SQLite query template with one `?` per parameter.
    pub sql: &'static str,
    /// Columns every result row carries, in order.
    pub columns: &'static [Column],
}

static CATALOG: [ReportDefinition; 10] = [
    ReportDefinition {
        path: "/crime_category_per_city",
        name: "crime_category_per_city",
        params: &[],
        sql: "SELECT City, Crime_Category, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY City, Crime_Category",
        columns: &[text("City"), text("Crime_Category"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_over_years",
        name: "crime_over_years",
        params: &[],
        sql: "SELECT DateYear, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY DateYear \
              ORDER BY DateYear",
        columns: &[integer("DateYear"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_per_month",
        name: "crime_per_month",
        params: &[ParamSpec::Enum {
            name: "city",
            allowed: SUPPORTED_CITIES,
        }],
        sql: "SELECT DateMonth, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              WHERE City = ? \
              GROUP BY DateMonth",
        columns: &[integer("DateMonth"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_by_date_range",
        name: "crime_by_date_range",
        params: &[
            ParamSpec::Date { name: "start_date" },
            ParamSpec::Date { name: "end_date" },
        ],
        sql: "SELECT CrimeDate, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              WHERE CrimeDate BETWEEN ? AND ? \
              GROUP BY CrimeDate \
              ORDER BY CrimeDate",
        columns: &[text("CrimeDate"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_comparison_per_year",
        name: "crime_comparison_per_year",
        params: &[],
        sql: "SELECT City, DateYear, Crime_Category, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY City, DateYear, Crime_Category",
        columns: &[
            text("City"),
            integer("DateYear"),
            text("Crime_Category"),
            integer("Crime_Count"),
        ],
    },
    ReportDefinition {
        path: "/crime_statistics_by_category",
        name: "crime_statistics_by_category",
        params: &[],
        sql: "SELECT Crime_Category, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY Crime_Category",
        columns: &[text("Crime_Category"), integer("Crime_Count")],
    },
    // Same aggregation as /crime_category_per_city; the legacy service
    // exposed it under both paths and chart clients depend on both.
    ReportDefinition {
        path: "/crime_per_city_category",
        name: "crime_per_city_category",
        params: &[],
        sql: "SELECT City, Crime_Category, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY City, Crime_Category",
        columns: &[text("City"), text("Crime_Category"), integer("Crime_Count")],
    },
    // strftime('%w') is 0=Sunday; shifted to the legacy 1=Sunday..7=Saturday
    // numbering the chart layer maps day names from.
    ReportDefinition {
        path: "/crime_by_day_of_week",
        name: "crime_by_day_of_week",
        params: &[],
        sql: "SELECT CAST(strftime('%w', CrimeDate) AS INTEGER) + 1 AS Day_Of_Week, \
              COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              GROUP BY Day_Of_Week \
              ORDER BY Day_Of_Week",
        columns: &[integer("Day_Of_Week"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_details_by_city_category",
        name: "crime_details_by_city_category",
        params: &[
            ParamSpec::Enum {
                name: "city",
                allowed: SUPPORTED_CITIES,
            },
            ParamSpec::Substring { name: "category" },
        ],
        sql: "SELECT Sub_Category, COUNT(*) AS Crime_Count \
              FROM crime_incidents \
              WHERE City = ? AND LOWER(Crime_Category) LIKE '%' || LOWER(?) || '%' \
              GROUP BY Sub_Category \
              ORDER BY Crime_Count DESC",
        columns: &[text("Sub_Category"), integer("Crime_Count")],
    },
    ReportDefinition {
        path: "/crime_location_density_by_city",
        name: "crime_location_density_by_city",
        params: &[ParamSpec::Enum {
            name: "city",
            allowed: SUPPORTED_CITIES,
        }],
        sql: "SELECT Latitude, Longitude \
              FROM crime_incidents \
              WHERE City = ?",
        columns: &[real("Latitude"), real("Longitude")],
    },
];

/// Lookup templates used by the geocode enrichment workflow. They live here
/// so the catalog stays the single home of query text.
pub const GEOCODE_CITIES_SQL: &str = "SELECT DISTINCT City FROM crime_incidents";

/// First coordinate pair matching city + sub-category substring. `LIMIT 1`
/// over the store's natural row order: which row is "first" is not
/// guaranteed stable across store implementations.
pub const GEOCODE_LOCATION_SQL: &str = "SELECT Latitude, Longitude \
     FROM crime_incidents \
     WHERE City = ? AND LOWER(Sub_Category) LIKE '%' || LOWER(?) || '%' \
     LIMIT 1";

/// All registered report definitions.
pub fn all() -> &'static [ReportDefinition] {
    &CATALOG
}

/// Find a definition by route path.
pub fn find(path: &str) -> Option<&'static ReportDefinition> {
    CATALOG.iter().find(|def| def.path == path)
}

/// Fetch a required parameter, treating blank values as absent.
pub fn require<'a>(params: &'a RawParams, name: &'static str) -> Result<&'a str, ApiError> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingParameter(name))
}

/// Validate a request's parameters against a definition and produce the
/// values to bind, in template order.
pub fn validate(def: &ReportDefinition, params: &RawParams) -> Result<Vec<String>, ApiError> {
    let mut bound = Vec::with_capacity(def.params.len());
    for spec in def.params {
        let value = require(params, spec.name())?;
        if let ParamSpec::Enum { name, allowed } = *spec {
            if !allowed.iter().any(|candidate| *candidate == value) {
                return Err(ApiError::InvalidEnumValue { name, allowed });
            }
        }
        bound.push(value.to_owned());
    }
    Ok(bound)
}
