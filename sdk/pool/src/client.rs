//! Shielded pool client capability.
//!
//! The pool is consumed, not implemented, here: commitments, proofs and
//! note encryption all live behind this trait. Whatever shape the
//! backend returns for a confirmation is normalized at this boundary
//! into one canonical [`SettlementRef`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::Address;
use crate::wallet::TransactionSigner;

/// Wallet signatures are ed25519: always 64 bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Opaque confirmation handle for a settled deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRef(String);

impl SettlementRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettlementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symmetric key the pool uses to encrypt and locate the payer's notes.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.write_str("EncryptionKey(..)")
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("deposit rejected by the pool: {0}")]
    DepositRejected(String),
    #[error("withdrawal rejected by the pool: {0}")]
    WithdrawRejected(String),
    #[error("pool backend unavailable: {0}")]
    Unavailable(String),
}

/// Derives the payer's note-encryption key from a wallet signature.
pub trait KeyDeriver {
    fn derive_key(&self, signature: &[u8; SIGNATURE_LEN]) -> EncryptionKey;
}

/// Capability surface of the external shielded pool.
///
/// Every call is a long-latency external operation; the orchestrator
/// treats them as cancellable-by-caller waits with no internal timeout.
#[allow(async_fn_in_trait)]
pub trait ShieldedPool: KeyDeriver + Send + Sync {
    /// Deposits native-asset base units into the pool for `payer`.
    async fn deposit<S: TransactionSigner>(
        &self,
        amount: u64,
        payer: &Address,
        signer: &S,
        key: &EncryptionKey,
    ) -> Result<SettlementRef, PoolError>;

    /// Withdraws native-asset base units from `payer`'s shielded balance
    /// to a public recipient address.
    async fn withdraw<S: TransactionSigner>(
        &self,
        amount: u64,
        recipient: &Address,
        payer: &Address,
        signer: &S,
        key: &EncryptionKey,
    ) -> Result<SettlementRef, PoolError>;

    /// Token variant of [`ShieldedPool::deposit`] with an explicit mint.
    async fn deposit_token<S: TransactionSigner>(
        &self,
        mint: &Address,
        amount: u64,
        payer: &Address,
        signer: &S,
        key: &EncryptionKey,
    ) -> Result<SettlementRef, PoolError>;

    /// Token variant of [`ShieldedPool::withdraw`] with an explicit mint.
    async fn withdraw_token<S: TransactionSigner>(
        &self,
        mint: &Address,
        amount: u64,
        recipient: &Address,
        payer: &Address,
        signer: &S,
        key: &EncryptionKey,
    ) -> Result<SettlementRef, PoolError>;
}
