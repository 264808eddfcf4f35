//! Toolcrib Server - Equipment Registry and Checkout Service
//!
//! A Rust JSON API server for tracking shared equipment.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toolcrib_server::{
    api,
    config::AppConfig,
    models::seed::SeedFile,
    services::Services,
    store::Store,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("toolcrib_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Toolcrib Server v{}", env!("CARGO_PKG_VERSION"));

    // Create the in-memory store and services
    let store = Store::new(&config.store, &config.idempotency);
    let services = Services::new(store, &config);

    // Seed the equipment table from the read-only feed file, if configured
    if let Some(ref path) = config.store.seed_path {
        let seed = SeedFile::load(path).expect("Failed to read seed file");
        let loaded = services
            .equipment
            .seed(seed)
            .await
            .expect("Failed to seed equipment store");
        tracing::info!("Seeded {} equipment records from {}", loaded, path);
    }

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
