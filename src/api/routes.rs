//! Router assembly: routes, CORS, body limit, and request tracing

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::handlers;
use crate::config::CorsConfig;
use crate::AppState;

/// Cap on the inbound request body; bounds memory use for image uploads
const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.settings.cors);

    Router::new()
        .route("/", get(handlers::home))
        .route("/api/analyze-changes", post(handlers::analyze_changes))
        .layer(DefaultBodyLimit::max(MAX_CONTENT_LENGTH))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    // Origins were checked by Settings::validate; unparseable ones are skipped
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
