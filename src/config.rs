//! Process configuration loaded from the environment

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Immutable configuration assembled once at startup and passed explicitly
/// into every component that needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Connection string for the incident store.
    pub database_url: String,
    /// Shared secret expected in the `key` query parameter.
    pub api_key: String,
    /// Base URL of the reverse-geocoding collaborator.
    pub geocoder_base_url: String,
    /// Upper bound on the external reverse-geocoding call.
    pub geocoder_timeout: Duration,
}

/// Configuration errors detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is required but not set")]
    Missing { name: &'static str },

    #[error("invalid value for {name}: {detail}")]
    Invalid { name: &'static str, detail: String },
}

impl AppConfig {
    /// Read configuration from environment variables.
    ///
    /// `API_KEY` has no default: the gateway refuses to start without a
    /// shared secret. Everything else falls back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = env_or("LISTEN_ADDR", "0.0.0.0:3000")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "LISTEN_ADDR",
                detail: format!("{e}"),
            })?;

        // mode=rwc lets the driver create the file on first run.
        let database_url = env_or("DATABASE_URL", "sqlite://crimescope.db?mode=rwc");

        let api_key = std::env::var("API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing { name: "API_KEY" })?;

        let geocoder_base_url = env_or("GEOCODER_BASE_URL", "https://nominatim.openstreetmap.org")
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = env_or("GEOCODER_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "GEOCODER_TIMEOUT_SECS",
                detail: format!("{e}"),
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "GEOCODER_TIMEOUT_SECS",
                detail: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            listen_addr,
            database_url,
            api_key,
            geocoder_base_url,
            geocoder_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
