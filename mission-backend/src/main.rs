use std::sync::Arc;
use std::time::Duration;

use mission_backend::config;
use mission_backend::model::launches::{LaunchImporter, LaunchManager, SpacexApiClient};
use mission_backend::model::planets::PlanetManager;
use mission_backend::service::{self, AppState};
use mission_backend::store::{DocumentStore, JsonFileStore};

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = mission_backend::logging::init_logging(
        &config.log_dir,
        "mission-backend",
        &config.log_level,
    )?;

    tracing::info!("Mission backend starting...");
    tracing::info!("Server will listen on {}", config.server_address());

    let store = Arc::new(JsonFileStore::open(&config.data_dir).await?);
    let store_handle: Arc<dyn DocumentStore> = store.clone();

    let planets = Arc::new(PlanetManager::new(store_handle.clone()));
    planets.load_planets_data(&config.planets_csv).await?;

    let launches = Arc::new(LaunchManager::new(
        store_handle.clone(),
        config.default_flight_number,
    ));

    let api_client = SpacexApiClient::new(
        config.launches_api_url.clone(),
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    let importer = LaunchImporter::new(api_client, launches.clone(), store_handle)
        .with_claim_lease(Duration::from_secs(config.import_claim_lease_seconds));
    match importer.load_launches_data().await {
        Ok(outcome) => tracing::info!("Launch data ready: {:?}", outcome),
        Err(e) => tracing::error!("Launch data import failed, continuing without it: {}", e),
    }

    let app = service::router(AppState { launches, planets });

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, closing store...");
    store.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
