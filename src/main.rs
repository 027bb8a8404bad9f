//! Main entry point for the UI Change Analysis Gateway

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use ui_analysis_gateway::{api, backend::InferenceClient, config::Settings, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up .env before reading configuration
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();

    info!("Starting UI Change Analysis Gateway");

    if !settings.has_upstream_credentials() {
        // Not fatal: the service still answers the liveness probe, and the
        // analyze route reports a configuration error per request.
        tracing::warn!("Upstream endpoint or API key not configured");
    }

    let inference = InferenceClient::new(settings.upstream.clone())?;

    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        inference,
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
