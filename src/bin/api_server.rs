// API Server Binary Entry Point
//
// Purpose: Start the Axum backend over the GLOBE measurement API
// Usage: cargo run --features api --bin api_server

use pollination_scorer::globe::{GlobeClient, MeasurementWindow, DEFAULT_BASE_URL};
use pollination_scorer::heatmap::DEFAULT_REGION_DELTA;
use pollination_scorer::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "pollination_scorer=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let base_url =
        std::env::var("GLOBE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let country_code = std::env::var("COUNTRY_CODE").unwrap_or_else(|_| "BRA".to_string());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let region_delta: f64 = std::env::var("HEAT_DELTA")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(DEFAULT_REGION_DELTA);

    let mut window = MeasurementWindow::last_two_years();
    if let Some(start) = std::env::var("WINDOW_START").ok().and_then(|s| s.parse().ok()) {
        window.start = start;
    }
    if let Some(end) = std::env::var("WINDOW_END").ok().and_then(|s| s.parse().ok()) {
        window.end = end;
    }

    tracing::info!("Configuration:");
    tracing::info!("  GLOBE_BASE_URL: {}", base_url);
    tracing::info!("  COUNTRY_CODE: {}", country_code);
    tracing::info!("  PORT: {}", port);
    tracing::info!("  HEAT_DELTA: {}", region_delta);
    tracing::info!("  WINDOW: {} .. {}", window.start, window.end);

    // Initialize application state
    let globe = GlobeClient::new(base_url)?;
    let state = AppState::new(globe, country_code, window, region_delta);
    tracing::info!("Application state initialized successfully");

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
