//! Store access layer with SQLx and SQLite
//!
//! All report queries run through [`Database::run_report`], which binds the
//! pre-validated parameter values into the definition's template. Nothing in
//! this module ever splices request data into query text.

use crate::catalog::{Column, ColumnType, ReportDefinition, GEOCODE_CITIES_SQL, GEOCODE_LOCATION_SQL};
use crate::error::ApiError;
use crate::models::{Incident, ReportRow};
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::time::Duration;
use tracing::info;

/// Store connection pool and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new store connection pool
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(connection_string)
            .await?;

        info!("Store connection pool established");

        Ok(Self { pool })
    }

    /// In-memory store for tests. A single connection is pinned open so
    /// every query sees the same database.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        let db = Self { pool };
        db.ensure_schema().await.expect("schema");
        db
    }

    /// Create the incident table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS crime_incidents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                City TEXT NOT NULL,
                Crime_Category TEXT NOT NULL,
                Sub_Category TEXT NOT NULL,
                CrimeDate TEXT NOT NULL,
                DateYear INTEGER NOT NULL,
                DateMonth INTEGER NOT NULL,
                Latitude REAL NOT NULL,
                Longitude REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert one incident row.
    pub async fn insert_incident(&self, incident: &Incident) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO crime_incidents \
             (City, Crime_Category, Sub_Category, CrimeDate, DateYear, DateMonth, Latitude, Longitude) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&incident.city)
        .bind(&incident.crime_category)
        .bind(&incident.sub_category)
        // NaiveDate encodes as ISO `YYYY-MM-DD` text, the stored format.
        .bind(incident.crime_date)
        .bind(incident.date_year)
        .bind(incident.date_month as i64)
        .bind(incident.latitude)
        .bind(incident.longitude)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Execute a report definition with its validated bind values and decode
    /// the rows into the declared column shape.
    pub async fn run_report(
        &self,
        def: &ReportDefinition,
        bound: &[String],
    ) -> Result<Vec<ReportRow>, ApiError> {
        let mut query = sqlx::query(def.sql);
        for value in bound {
            query = query.bind(value.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| decode_row(row, def.columns))
            .collect()
    }

    /// Distinct cities actually present in the store.
    pub async fn distinct_cities(&self) -> Result<Vec<String>, ApiError> {
        let rows = sqlx::query(GEOCODE_CITIES_SQL).fetch_all(&self.pool).await?;
        let mut cities = Vec::with_capacity(rows.len());
        for row in &rows {
            cities.push(row.try_get::<String, _>("City").map_err(ApiError::from)?);
        }
        Ok(cities)
    }

    /// First coordinate pair matching a city and sub-category substring.
    pub async fn first_location(
        &self,
        city: &str,
        sub_category: &str,
    ) -> Result<Option<(f64, f64)>, ApiError> {
        let row = sqlx::query(GEOCODE_LOCATION_SQL)
            .bind(city)
            .bind(sub_category)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let lat = row.try_get::<f64, _>("Latitude").map_err(ApiError::from)?;
                let lon = row.try_get::<f64, _>("Longitude").map_err(ApiError::from)?;
                Ok(Some((lat, lon)))
            }
            None => Ok(None),
        }
    }

    /// Liveness probe against the store.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Decode one row into a JSON object keyed by the declared column names.
/// NULLs become JSON nulls; non-finite reals decode as null as well since
/// JSON has no representation for them.
fn decode_row(row: &SqliteRow, columns: &[Column]) -> Result<ReportRow, ApiError> {
    let mut object = ReportRow::new();
    for col in columns {
        let value = match col.ty {
            ColumnType::Text => row
                .try_get::<Option<String>, _>(col.name)
                .map_err(ApiError::from)?
                .map(Value::String)
                .unwrap_or(Value::Null),
            ColumnType::Integer => row
                .try_get::<Option<i64>, _>(col.name)
                .map_err(ApiError::from)?
                .map(Value::from)
                .unwrap_or(Value::Null),
            ColumnType::Real => row
                .try_get::<Option<f64>, _>(col.name)
                .map_err(ApiError::from)?
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        };
        object.insert(col.name.to_string(), value);
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::incident;

    async fn seeded() -> Database {
        let db = Database::in_memory().await;
        for row in [
            incident("Seattle", "Theft", "Shoplifting", "2020-01-05", 47.60, -122.33),
            incident("Seattle", "Theft", "Shoplifting", "2020-03-08", 47.61, -122.34),
            incident("Seattle", "Theft", "Burglary", "2020-02-10", 47.62, -122.35),
            incident("Chicago", "Assault", "Aggravated Assault", "2020-01-05", 41.88, -87.62),
            incident("San Francisco", "Fraud", "Check Fraud", "2022-11-02", 37.77, -122.42),
        ] {
            db.insert_incident(&row).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn run_report_decodes_declared_columns() {
        let db = seeded().await;
        let def = catalog::find("/crime_category_per_city").unwrap();
        let rows = db.run_report(def, &[]).await.unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert!(row["City"].is_string());
            assert!(row["Crime_Category"].is_string());
            assert!(row["Crime_Count"].is_i64());
        }
        let seattle_theft = rows
            .iter()
            .find(|row| row["City"] == "Seattle" && row["Crime_Category"] == "Theft")
            .unwrap();
        assert_eq!(seattle_theft["Crime_Count"], 3);
    }

    #[tokio::test]
    async fn run_report_binds_parameters() {
        let db = seeded().await;
        let def = catalog::find("/crime_per_month").unwrap();
        let rows = db
            .run_report(def, &["Seattle".to_string()])
            .await
            .unwrap();
        let months: Vec<i64> = rows
            .iter()
            .map(|row| row["DateMonth"].as_i64().unwrap())
            .collect();
        assert!(months.contains(&1));
        assert!(months.contains(&2));
        assert!(months.contains(&3));
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn empty_result_is_ok_not_error() {
        let db = seeded().await;
        let def = catalog::find("/crime_by_date_range").unwrap();
        let rows = db
            .run_report(def, &["1990-01-01".to_string(), "1990-12-31".to_string()])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn distinct_cities_reflects_store_contents() {
        let db = seeded().await;
        let mut cities = db.distinct_cities().await.unwrap();
        cities.sort();
        assert_eq!(cities, vec!["Chicago", "San Francisco", "Seattle"]);
    }

    #[tokio::test]
    async fn first_location_matches_substring_case_insensitively() {
        let db = seeded().await;
        let found = db.first_location("Seattle", "shoplift").await.unwrap();
        let (lat, lon) = found.expect("coordinate pair");
        assert!((47.0..48.0).contains(&lat));
        assert!((-123.0..-122.0).contains(&lon));

        let missing = db.first_location("Seattle", "arson").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn day_of_week_uses_sunday_one_numbering() {
        let db = Database::in_memory().await;
        // 2020-01-05 was a Sunday.
        db.insert_incident(&incident(
            "Seattle",
            "Theft",
            "Shoplifting",
            "2020-01-05",
            47.60,
            -122.33,
        ))
        .await
        .unwrap();
        let def = catalog::find("/crime_by_day_of_week").unwrap();
        let rows = db.run_report(def, &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Day_Of_Week"], 1);
        assert_eq!(rows[0]["Crime_Count"], 1);
    }
}
