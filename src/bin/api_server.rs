// API Server Binary Entry Point
//
// Purpose: Start the Axum API server for report generation
// Usage: cargo run --bin api_server

use qedu_reports::{create_router, AppState, Settings};
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
                    "qedu_reports=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables (QEDU_* and PORT)
    let settings = Settings::from_env();
    let port = settings.port;

    tracing::info!("Configuration:");
    tracing::info!("  BASE_URL: {}", settings.base_url);
    tracing::info!("  MUNICIPAL_TABLE: {}", settings.municipal_table.display());
    tracing::info!("  STATE_TABLE: {}", settings.state_table.display());
    tracing::info!("  TIMEOUT: {:?}", settings.timeout);
    tracing::info!("  PORT: {}", port);

    let state = AppState::new(settings);

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
