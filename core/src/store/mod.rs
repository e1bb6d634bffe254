//! Ephemeral Link Store
//!
//! Short-lived payment-terms records behind an opaque identifier. A link
//! is written once, read any number of times until its TTL elapses, and
//! never updated or explicitly deleted: expiry is the only removal path,
//! enforced by the store itself on read.

pub mod http;
pub mod memory;
pub mod rocks;

pub use http::HttpLinkClient;
pub use memory::MemoryLinkStore;
pub use rocks::RocksLinkStore;

use rand_core::{OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use veilpay_pool::Address;

/// Link identifiers are 12 characters from a 62-symbol alphabet.
pub const ID_LENGTH: usize = 12;

const ID_ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Labels are free text but bounded.
pub const MAX_LABEL_LEN: usize = 200;

/// Payment terms as created by the payee and returned to payers.
///
/// Immutable after creation. The recipient address lives only here,
/// server-side; it never appears in the shareable URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTerms {
    pub recipient: Address,
    pub token: String,
    /// Fixed amount; when absent the payer chooses at payment time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LinkTerms {
    /// Checks the bounds `create` enforces before writing anything.
    pub fn validate(&self) -> Result<(), LinkStoreError> {
        if self.token.is_empty() {
            return Err(LinkStoreError::InvalidTerms("token is empty".into()));
        }
        if let Some(label) = &self.label {
            if label.len() > MAX_LABEL_LEN {
                return Err(LinkStoreError::InvalidTerms(format!(
                    "label exceeds {} bytes",
                    MAX_LABEL_LEN
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LinkStoreError {
    #[error("invalid link id: {0}")]
    InvalidId(String),
    #[error("invalid link terms: {0}")]
    InvalidTerms(String),
    #[error("payment link not found or expired")]
    NotFound,
    #[error("link storage unavailable: {0}")]
    Storage(String),
}

/// Durable-but-ephemeral mapping from link id to payment terms.
#[allow(async_fn_in_trait)]
pub trait LinkStore: Send + Sync {
    /// Stores `terms` under a fresh identifier and returns it.
    async fn create(&self, terms: LinkTerms) -> Result<String, LinkStoreError>;

    /// Reads the terms for `id`; `NotFound` when absent or expired.
    async fn get(&self, id: &str) -> Result<LinkTerms, LinkStoreError>;
}

/// Generates a fresh link identifier.
///
/// 62^12 ids make collisions negligible; no collision check is done.
pub fn generate_id() -> Result<String, LinkStoreError> {
    let mut bytes = [0u8; ID_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| LinkStoreError::Storage(format!("rng failure: {}", e)))?;
    Ok(bytes
        .iter()
        .map(|b| ID_ALPHABET[(b % 62) as usize] as char)
        .collect())
}

/// Rejects ids that could never have come out of [`generate_id`].
pub fn validate_id(id: &str) -> Result<(), LinkStoreError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LinkStoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Shareable URL for a link: `<origin>/pay/<id>`.
///
/// Only the opaque id is encoded; no payment terms leak into the URL.
pub fn share_url(origin: &str, id: &str) -> String {
    format!("{}/pay/{}", origin.trim_end_matches('/'), id)
}

/// Unix seconds, for `created_at` stamps and expiry checks.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// On-disk record: the terms plus the creation stamp expiry is computed
/// from. `created_at` is internal and never returned over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredLink {
    #[serde(flatten)]
    pub terms: LinkTerms,
    pub created_at: u64,
}

impl StoredLink {
    pub fn expired(&self, ttl_secs: u64, now: u64) -> bool {
        now >= self.created_at.saturating_add(ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_well_formed() {
        for _ in 0..32 {
            let id = generate_id().unwrap();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(validate_id(&id).is_ok());
        }
    }

    #[test]
    fn ids_are_not_repeated() {
        let a = generate_id().unwrap();
        let b = generate_id().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn id_validation_rejects_junk() {
        assert!(validate_id("").is_err());
        assert!(validate_id("abc/../etc").is_err());
        assert!(validate_id("has space").is_err());
        assert!(validate_id("aB3xY9kQ2mNp").is_ok());
    }

    #[test]
    fn share_url_format() {
        assert_eq!(
            share_url("https://veilpay.example", "aB3xY9kQ2mNp"),
            "https://veilpay.example/pay/aB3xY9kQ2mNp"
        );
        // trailing slash on the origin is tolerated
        assert_eq!(share_url("http://localhost:3000/", "x1y2z3a4b5c6"),
            "http://localhost:3000/pay/x1y2z3a4b5c6"
        );
    }

    #[test]
    fn terms_validation_bounds_label() {
        let terms = LinkTerms {
            recipient: Address([1u8; 32]),
            token: "SOL".into(),
            amount: None,
            label: Some("x".repeat(MAX_LABEL_LEN + 1)),
        };
        assert!(terms.validate().is_err());

        let terms = LinkTerms {
            label: Some("Coffee".into()),
            ..terms
        };
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn terms_validation_requires_token() {
        let terms = LinkTerms {
            recipient: Address([1u8; 32]),
            token: "".into(),
            amount: None,
            label: None,
        };
        assert!(terms.validate().is_err());
    }

    #[test]
    fn expiry_boundary() {
        let stored = StoredLink {
            terms: LinkTerms {
                recipient: Address([1u8; 32]),
                token: "SOL".into(),
                amount: None,
                label: None,
            },
            created_at: 1000,
        };
        assert!(!stored.expired(60, 1059));
        assert!(stored.expired(60, 1060));
        assert!(stored.expired(0, 1000));
    }
}
