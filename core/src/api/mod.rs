//! API Module
//!
//! HTTP endpoints for creating and resolving payment links.

pub mod handlers;
pub mod routes;
pub mod types;

pub use handlers::ApiState;
pub use routes::create_router;
