//! Wallet capability traits.
//!
//! The wallet is an external, possibly user-interactive collaborator.
//! Both signing calls may block on human interaction indefinitely; the
//! caller decides how long to wait.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    /// The user declined the interactive prompt.
    #[error("user rejected the signature request")]
    Rejected,
    #[error("signing failed: {0}")]
    Failed(String),
}

/// Signs an arbitrary message (used for the sign-in key derivation).
#[allow(async_fn_in_trait)]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Signs a serialized transaction produced by the pool.
#[allow(async_fn_in_trait)]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(&self, tx: &[u8]) -> Result<Vec<u8>, SignerError>;
}
