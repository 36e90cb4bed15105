//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ally_core::config::AllyConfig;
use ally_core::error::AllyError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The browser frontend is served from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/api/chat", post(handlers::chat))
        .route("/api/chat/history", get(handlers::chat_history))
        .route("/api/marketplace/caregivers", get(handlers::caregivers))
        .route("/api/marketplace/book", post(handlers::book))
        .route("/api/marketplace/bookings", get(handlers::bookings))
        .route("/api/telemedicine/start", post(handlers::telemedicine_start))
        .route("/api/telemedicine/end", post(handlers::telemedicine_end))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured bind address and port.
pub async fn start_server(config: &AllyConfig, state: AppState) -> Result<(), AllyError> {
    let addr = format!("{}:{}", config.general.bind_address, config.general.port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AllyError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| AllyError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
