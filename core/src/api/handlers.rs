//! API Handlers
//!
//! Request handlers for the HTTP API.

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use log::{error, info};

use super::types::*;
use crate::store::{LinkStore, LinkStoreError, LinkTerms, RocksLinkStore};
use veilpay_pool::Address;

// ============================================================================
// Shared State
// ============================================================================

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<RocksLinkStore>,
    pub start_time: std::time::Instant,
}

// ============================================================================
// Health
// ============================================================================

/// Health check endpoint
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
    })
}

// ============================================================================
// Payment Links
// ============================================================================

/// Create a payment link
pub async fn create_link(
    State(state): State<ApiState>,
    Json(req): Json<CreateLinkRequest>,
) -> impl IntoResponse {
    let (recipient, token) = match (req.recipient, req.token) {
        (Some(r), Some(t)) => (r, t),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Missing required fields")),
            )
                .into_response();
        }
    };

    let recipient: Address = match recipient.parse() {
        Ok(addr) => addr,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Invalid recipient address: {}",
                    e
                ))),
            )
                .into_response();
        }
    };

    let terms = LinkTerms {
        recipient,
        token,
        amount: req.amount,
        label: req.label,
    };

    match state.store.create(terms).await {
        Ok(id) => {
            info!("Payment link created: {}", id);
            Json(CreateLinkResponse { id }).into_response()
        }
        Err(LinkStoreError::InvalidTerms(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(msg)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create payment link: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Failed to create payment link")),
            )
                .into_response()
        }
    }
}

/// Resolve a payment link by id
pub async fn get_link(
    State(state): State<ApiState>,
    Query(params): Query<GetLinkParams>,
) -> impl IntoResponse {
    let id = match params.id {
        Some(id) => id,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Missing id parameter")),
            )
                .into_response();
        }
    };

    match state.store.get(&id).await {
        Ok(terms) => Json(LinkResponse {
            recipient: terms.recipient.to_string(),
            token: terms.token,
            amount: terms.amount,
            label: terms.label,
        })
        .into_response(),
        Err(LinkStoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Payment link not found or expired")),
        )
            .into_response(),
        Err(LinkStoreError::InvalidId(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid link id")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to resolve payment link: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Failed to resolve payment link")),
            )
                .into_response()
        }
    }
}
