//! API Routes
//!
//! Router configuration for the HTTP API.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::handlers::{self, ApiState};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Payment links
        .route("/links", post(handlers::create_link).get(handlers::get_link))
        // CORS
        .layer(CorsLayer::permissive())
        .with_state(state)
}
