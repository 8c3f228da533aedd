//! Crimescope - read-only analytics gateway over a crime incident dataset

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crimescope::config::AppConfig;
use crimescope::db::Database;
use crimescope::routes;
use crimescope::services::geocoder::ReverseGeocoder;
use crimescope::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crimescope=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Connect to the incident store
    let db = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to connect to store");
            std::process::exit(1);
        }
    };

    if let Err(e) = db.ensure_schema().await {
        error!(error = %e, "Failed to prepare store schema");
        std::process::exit(1);
    }

    // Reverse geocoding client
    let geocoder = match ReverseGeocoder::new(&config.geocoder_base_url, config.geocoder_timeout) {
        Ok(geocoder) => geocoder,
        Err(e) => {
            error!(error = %e, "Failed to build reverse geocoding client");
            std::process::exit(1);
        }
    };

    let listen_addr = config.listen_addr;
    let database_url = config.database_url.clone();
    let geocoder_base_url = config.geocoder_base_url.clone();

    // Create application state and router
    let state = AppState::new(config, db, geocoder);
    let app = routes::app(state);

    info!(
        "Crimescope v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        listen_addr
    );
    info!("Store: {}", database_url.split('@').last().unwrap_or("***"));
    info!("Reverse geocoder: {}", geocoder_base_url);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
