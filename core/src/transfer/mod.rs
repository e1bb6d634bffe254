//! Private Transfer Orchestration
//!
//! Drives a multi-recipient private transfer through the shielded pool:
//! one deposit of the full amount, then one withdrawal per recipient.
//! The deposit is all-or-nothing; withdrawals fail individually without
//! stopping the rest, and every outcome is reported per recipient.

pub mod link_adapter;
pub mod orchestrator;

pub use link_adapter::{PayLinkError, pay_via_link};
pub use orchestrator::Orchestrator;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veilpay_pool::{AddressError, SettlementRef};

/// Upper bound on recipients per transfer.
pub const MAX_RECIPIENTS: usize = 5;

/// A transfer as requested by the payer, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub token: String,
    /// Total amount in whole units, split evenly across recipients.
    pub amount: String,
    pub recipients: Vec<String>,
}

/// Overall result of a transfer attempt that got past validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Deposit and every withdrawal settled.
    Completed,
    /// Deposit settled; some but not all withdrawals did.
    PartialFailure,
    /// Deposit failed, or it settled and every withdrawal failed.
    Failed,
}

/// Per-recipient withdrawal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientOutcome {
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientOutcome {
    pub fn succeeded(&self) -> bool {
        self.settlement.is_some()
    }
}

/// Full account of what a transfer attempt did.
///
/// Funds stranded in the pool after a partial failure are visible here:
/// `deposit` settled but some `outcomes` carry errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<SettlementRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_error: Option<String>,
    pub outcomes: Vec<RecipientOutcome>,
    pub status: TransferStatus,
}

/// Validation failures. None of these have side effects: the pool has
/// not been touched when one is returned.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("no key session; sign in before transferring")]
    EncryptionNotInitialized,
    #[error("recipient {index} is not a valid address ({address}): {source}")]
    InvalidRecipient {
        index: usize,
        address: String,
        source: AddressError,
    },
    #[error("invalid amount {0:?}: {1}")]
    InvalidAmount(String, String),
    #[error("recipient count must be between 1 and {MAX_RECIPIENTS}, got {0}")]
    InvalidRecipientCount(usize),
    #[error("unsupported token: {0}")]
    UnknownToken(String),
    #[error("token registry holds an invalid mint address: {0}")]
    InvalidTokenMint(String),
}
