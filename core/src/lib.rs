//! VeilPay Core
//!
//! Payment-link store with its HTTP surface, and the private transfer
//! orchestrator that moves funds through the external shielded pool.

pub mod api;
pub mod store;
pub mod transfer;
