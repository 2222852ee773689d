//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, and a body limit sized
//! for uploaded audio.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sahayak_core::{Result, SahayakError};

use crate::handlers;
use crate::state::AppState;

/// Voice answers arrive as raw WAV bodies; a minute of 16 kHz mono PCM is
/// roughly 2 MB, so 10 MB leaves generous headroom.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/session/start", post(handlers::start_session))
        .route(
            "/session/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/session/{id}/questions", get(handlers::get_questions))
        .route("/session/{id}/text", post(handlers::process_text))
        .route("/session/{id}/audio", post(handlers::process_audio))
        .route("/session/{id}/data", get(handlers::get_data))
        .route("/session/{id}/skip", post(handlers::skip_group))
        .route("/form/{id}/fill", post(handlers::fill_form))
        .route("/form/{id}/status", get(handlers::form_status))
        .route("/form/{id}/preview", get(handlers::form_preview))
        .route("/form/{id}/screenshot", get(handlers::form_screenshot))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SahayakError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| SahayakError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
