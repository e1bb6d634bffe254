//! API Types
//!
//! Request/response types for the HTTP API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Payment Links
// ============================================================================

/// Request to create a payment link.
///
/// Required fields are `Option` so missing ones produce a 400 with a
/// clear message instead of a deserialization failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    pub recipient: Option<String>,
    pub token: Option<String>,
    /// Fixed amount in whole units. Absent for payer-chooses links.
    pub amount: Option<String>,
    pub label: Option<String>,
}

/// Response after creating a link
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    pub id: String,
}

/// Query parameters for resolving a link
#[derive(Debug, Deserialize)]
pub struct GetLinkParams {
    pub id: Option<String>,
}

/// A resolved payment link
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub recipient: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub uptime_secs: u64,
}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(msg, "BAD_REQUEST")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(msg, "INTERNAL_ERROR")
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(msg, "NOT_FOUND")
    }
}
