// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over the suitability engine
// Usage: cargo run --features api --bin api_server

use crop_suitability::{create_router, AppState, EngineConfig, EngineContext};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_suitability=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = EngineConfig::from_env()?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5004);

    tracing::info!("Configuration:");
    tracing::info!("  PROVINCE_AREA_KM2: {}", config.province_area_km2);
    tracing::info!("  SUMMARY_TTL_SECS: {}", config.summary_ttl_secs);
    tracing::info!("  REPORT_TTL_SECS: {}", config.report_ttl_secs);
    tracing::info!("  CROP_WEIGHTS_PATH: {:?}", config.crop_weights_path);
    tracing::info!("  PORT: {}", port);

    // Initialize engine context (crop weights, zoning engine, cache)
    let context = EngineContext::initialized(config)?;
    tracing::info!("Engine context initialized successfully");

    // Create router with all endpoints and middleware
    let app = create_router(AppState::new(context));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
