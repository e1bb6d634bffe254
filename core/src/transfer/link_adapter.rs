//! Link-backed payments.
//!
//! Resolves a payment link and hands its terms to the orchestrator as a
//! single-recipient transfer. A fixed amount on the link always wins
//! over whatever the payer typed.

use log::info;

use thiserror::Error;
use veilpay_pool::{Address, ShieldedPool, TransactionSigner};
use veilpay_session::KeySession;

use super::{Orchestrator, TransferError, TransferRequest, TransferResult};
use crate::store::{LinkStore, LinkStoreError};

#[derive(Debug, Error)]
pub enum PayLinkError {
    #[error("payment link not found or expired")]
    LinkNotFound,
    #[error("invalid link id: {0}")]
    InvalidId(String),
    #[error("link storage unavailable: {0}")]
    Storage(String),
    #[error("this link has no fixed amount; specify one")]
    AmountRequired,
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl From<LinkStoreError> for PayLinkError {
    fn from(e: LinkStoreError) -> Self {
        match e {
            LinkStoreError::NotFound => PayLinkError::LinkNotFound,
            LinkStoreError::InvalidId(id) => PayLinkError::InvalidId(id),
            LinkStoreError::InvalidTerms(msg) | LinkStoreError::Storage(msg) => {
                PayLinkError::Storage(msg)
            }
        }
    }
}

/// Pays the link `id`.
///
/// `amount` is the payer's choice and only applies when the link left
/// the amount open.
pub async fn pay_via_link<L, P, S>(
    store: &L,
    orchestrator: &Orchestrator<P>,
    payer: &Address,
    signer: &S,
    session: Option<&KeySession>,
    id: &str,
    amount: Option<&str>,
) -> Result<TransferResult, PayLinkError>
where
    L: LinkStore,
    P: ShieldedPool,
    S: TransactionSigner,
{
    let terms = store.get(id).await?;

    let amount = terms
        .amount
        .as_deref()
        .or(amount)
        .ok_or(PayLinkError::AmountRequired)?;

    info!("Paying link {}: {} {}", id, amount, terms.token);

    let request = TransferRequest {
        token: terms.token.clone(),
        amount: amount.to_string(),
        recipients: vec![terms.recipient.to_string()],
    };

    let result = orchestrator
        .transfer(payer, signer, session, &request)
        .await?;
    Ok(result)
}
