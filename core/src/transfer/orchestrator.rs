//! Transfer orchestrator.
//!
//! Sequencing rules: the deposit must settle before any withdrawal is
//! attempted, and withdrawals run one at a time in recipient order. A
//! failed withdrawal is recorded and the loop continues; the funds it
//! would have moved stay in the payer's shielded balance.

use std::time::Duration;

use log::{info, warn};
use veilpay_pool::{
    Address, EncryptionKey, ShieldedPool, Token, TransactionSigner, to_base_units, token,
};
use veilpay_session::KeySession;

use super::{
    MAX_RECIPIENTS, RecipientOutcome, TransferError, TransferRequest, TransferResult,
    TransferStatus,
};

/// Pause between a token deposit settling and the first withdrawal, so
/// the pool's indexer observes the deposited notes.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// A request that passed validation, with everything resolved.
struct ValidatedTransfer {
    token: &'static Token,
    total: u64,
    recipients: Vec<Address>,
    key: EncryptionKey,
}

pub struct Orchestrator<P> {
    pool: P,
    settle_delay: Duration,
}

impl<P: ShieldedPool> Orchestrator<P> {
    pub fn new(pool: P) -> Self {
        Self::with_settle_delay(pool, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle_delay(pool: P, settle_delay: Duration) -> Self {
        Self { pool, settle_delay }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Checks the whole request before anything irreversible happens.
    fn validate(
        session: Option<&KeySession>,
        request: &TransferRequest,
    ) -> Result<ValidatedTransfer, TransferError> {
        let session = session.ok_or(TransferError::EncryptionNotInitialized)?;

        let count = request.recipients.len();
        if count == 0 || count > MAX_RECIPIENTS {
            return Err(TransferError::InvalidRecipientCount(count));
        }

        let mut recipients = Vec::with_capacity(count);
        for (index, raw) in request.recipients.iter().enumerate() {
            let address = raw.parse().map_err(|source| TransferError::InvalidRecipient {
                index,
                address: raw.clone(),
                source,
            })?;
            recipients.push(address);
        }

        let token = token::by_symbol(&request.token)
            .ok_or_else(|| TransferError::UnknownToken(request.token.clone()))?;

        let total = to_base_units(&request.amount, token.decimals)
            .map_err(|e| TransferError::InvalidAmount(request.amount.clone(), e.to_string()))?;
        if total == 0 {
            return Err(TransferError::InvalidAmount(
                request.amount.clone(),
                "amount must be positive".into(),
            ));
        }

        Ok(ValidatedTransfer {
            token,
            total,
            recipients,
            key: session.key().clone(),
        })
    }

    /// Runs a transfer end to end.
    ///
    /// `Err` means validation failed and the pool was never touched.
    /// `Ok` means a deposit was attempted; inspect the result for what
    /// actually settled.
    pub async fn transfer<S: TransactionSigner>(
        &self,
        payer: &Address,
        signer: &S,
        session: Option<&KeySession>,
        request: &TransferRequest,
    ) -> Result<TransferResult, TransferError> {
        let plan = Self::validate(session, request)?;

        let mint = plan
            .token
            .mint_address()
            .map_err(|e| TransferError::InvalidTokenMint(e.to_string()))?;

        info!(
            "Starting private transfer: {} {} to {} recipient(s)",
            request.amount,
            plan.token.symbol,
            plan.recipients.len()
        );

        // Deposit the full amount once. If this fails nothing moved.
        let deposit = match &mint {
            Some(mint) => {
                self.pool
                    .deposit_token(mint, plan.total, payer, signer, &plan.key)
                    .await
            }
            None => self.pool.deposit(plan.total, payer, signer, &plan.key).await,
        };

        let deposit = match deposit {
            Ok(settlement) => settlement,
            Err(e) => {
                warn!("Deposit failed, transfer aborted: {}", e);
                return Ok(TransferResult {
                    deposit: None,
                    deposit_error: Some(e.to_string()),
                    outcomes: vec![],
                    status: TransferStatus::Failed,
                });
            }
        };

        // Token deposits need a settle pause before the notes are
        // spendable.
        if mint.is_some() && !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        // Even split; any sub-base-unit remainder stays shielded.
        let share = plan.total / plan.recipients.len() as u64;

        let mut outcomes = Vec::with_capacity(plan.recipients.len());
        for (index, recipient) in plan.recipients.iter().enumerate() {
            let result = match &mint {
                Some(mint) => {
                    self.pool
                        .withdraw_token(mint, share, recipient, payer, signer, &plan.key)
                        .await
                }
                None => {
                    self.pool
                        .withdraw(share, recipient, payer, signer, &plan.key)
                        .await
                }
            };

            match result {
                Ok(settlement) => outcomes.push(RecipientOutcome {
                    recipient: recipient.to_string(),
                    settlement: Some(settlement),
                    error: None,
                }),
                Err(e) => {
                    warn!("Withdrawal {} of {} failed: {}", index + 1, plan.recipients.len(), e);
                    outcomes.push(RecipientOutcome {
                        recipient: recipient.to_string(),
                        settlement: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        let status = if succeeded == outcomes.len() {
            TransferStatus::Completed
        } else if succeeded > 0 {
            TransferStatus::PartialFailure
        } else {
            TransferStatus::Failed
        };

        info!(
            "Transfer finished: {}/{} withdrawals settled",
            succeeded,
            outcomes.len()
        );

        Ok(TransferResult {
            deposit: Some(deposit),
            deposit_error: None,
            outcomes,
            status,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use veilpay_pool::{
        KeyDeriver, PoolError, SIGNATURE_LEN, SettlementRef, SignerError,
    };

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Deposit { amount: u64, mint: Option<Address> },
        Withdraw {
            amount: u64,
            recipient: Address,
            mint: Option<Address>,
        },
    }

    /// Records every call and fails on command.
    #[derive(Default)]
    pub struct MockPool {
        pub calls: Mutex<Vec<Call>>,
        pub fail_deposit: bool,
        pub fail_recipients: HashSet<Address>,
    }

    impl MockPool {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn next_ref(&self) -> SettlementRef {
            SettlementRef::new(format!("settle-{}", self.calls.lock().unwrap().len()))
        }
    }

    impl KeyDeriver for MockPool {
        fn derive_key(&self, signature: &[u8; SIGNATURE_LEN]) -> EncryptionKey {
            let mut key = [0u8; 32];
            key.copy_from_slice(&signature[..32]);
            EncryptionKey::from_bytes(key)
        }
    }

    impl ShieldedPool for MockPool {
        async fn deposit<S: TransactionSigner>(
            &self,
            amount: u64,
            _payer: &Address,
            _signer: &S,
            _key: &EncryptionKey,
        ) -> Result<SettlementRef, PoolError> {
            self.record(Call::Deposit { amount, mint: None });
            if self.fail_deposit {
                return Err(PoolError::DepositRejected("insufficient balance".into()));
            }
            Ok(self.next_ref())
        }

        async fn withdraw<S: TransactionSigner>(
            &self,
            amount: u64,
            recipient: &Address,
            _payer: &Address,
            _signer: &S,
            _key: &EncryptionKey,
        ) -> Result<SettlementRef, PoolError> {
            self.record(Call::Withdraw {
                amount,
                recipient: *recipient,
                mint: None,
            });
            if self.fail_recipients.contains(recipient) {
                return Err(PoolError::WithdrawRejected("proof rejected".into()));
            }
            Ok(self.next_ref())
        }

        async fn deposit_token<S: TransactionSigner>(
            &self,
            mint: &Address,
            amount: u64,
            _payer: &Address,
            _signer: &S,
            _key: &EncryptionKey,
        ) -> Result<SettlementRef, PoolError> {
            self.record(Call::Deposit {
                amount,
                mint: Some(*mint),
            });
            if self.fail_deposit {
                return Err(PoolError::DepositRejected("insufficient balance".into()));
            }
            Ok(self.next_ref())
        }

        async fn withdraw_token<S: TransactionSigner>(
            &self,
            mint: &Address,
            amount: u64,
            recipient: &Address,
            _payer: &Address,
            _signer: &S,
            _key: &EncryptionKey,
        ) -> Result<SettlementRef, PoolError> {
            self.record(Call::Withdraw {
                amount,
                recipient: *recipient,
                mint: Some(*mint),
            });
            if self.fail_recipients.contains(recipient) {
                return Err(PoolError::WithdrawRejected("proof rejected".into()));
            }
            Ok(self.next_ref())
        }
    }

    pub struct MockSigner;

    impl TransactionSigner for MockSigner {
        async fn sign_transaction(&self, _tx: &[u8]) -> Result<Vec<u8>, SignerError> {
            Ok(vec![0u8; 64])
        }
    }

    pub fn addr(n: u8) -> Address {
        Address([n; 32])
    }

    pub fn addr_str(n: u8) -> String {
        addr(n).to_string()
    }

    pub fn session() -> KeySession {
        KeySession::new(addr(1), EncryptionKey::from_bytes([9u8; 32]))
    }

    fn orchestrator(pool: MockPool) -> Orchestrator<MockPool> {
        Orchestrator::with_settle_delay(pool, Duration::ZERO)
    }

    fn request(token: &str, amount: &str, recipients: &[u8]) -> TransferRequest {
        TransferRequest {
            token: token.into(),
            amount: amount.into(),
            recipients: recipients.iter().map(|&n| addr_str(n)).collect(),
        }
    }

    #[tokio::test]
    async fn full_transfer_completes() {
        let orch = orchestrator(MockPool::default());
        let req = request("SOL", "3", &[2, 3, 4]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::Completed);
        assert!(result.deposit.is_some());
        assert_eq!(result.outcomes.len(), 3);
        assert!(result.outcomes.iter().all(|o| o.succeeded()));

        // Deposit first, then one withdrawal per recipient in order
        let calls = orch.pool().calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[0],
            Call::Deposit {
                amount: 3_000_000_000,
                mint: None
            }
        );
        for (i, n) in [2u8, 3, 4].iter().enumerate() {
            assert_eq!(
                calls[i + 1],
                Call::Withdraw {
                    amount: 1_000_000_000,
                    recipient: addr(*n),
                    mint: None
                }
            );
        }
    }

    #[tokio::test]
    async fn deposit_failure_attempts_no_withdrawals() {
        let orch = orchestrator(MockPool {
            fail_deposit: true,
            ..Default::default()
        });
        let req = request("SOL", "1", &[2, 3]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::Failed);
        assert!(result.deposit.is_none());
        assert!(result.deposit_error.is_some());
        assert!(result.outcomes.is_empty());
        assert_eq!(orch.pool().calls().len(), 1);
    }

    #[tokio::test]
    async fn one_failed_withdrawal_is_partial() {
        let orch = orchestrator(MockPool {
            fail_recipients: HashSet::from([addr(3)]),
            ..Default::default()
        });
        let req = request("SOL", "3", &[2, 3, 4]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::PartialFailure);
        assert!(result.deposit.is_some());
        assert_eq!(result.outcomes.len(), 3);
        assert!(result.outcomes[0].succeeded());
        assert!(!result.outcomes[1].succeeded());
        assert_eq!(result.outcomes[1].recipient, addr_str(3));
        assert!(result.outcomes[1].error.is_some());
        assert!(result.outcomes[2].succeeded());
    }

    #[tokio::test]
    async fn all_withdrawals_failing_is_failed_with_deposit() {
        let orch = orchestrator(MockPool {
            fail_recipients: HashSet::from([addr(2), addr(3)]),
            ..Default::default()
        });
        let req = request("SOL", "2", &[2, 3]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();

        // The deposit settled, so the funds are stranded shielded
        assert_eq!(result.status, TransferStatus::Failed);
        assert!(result.deposit.is_some());
        assert!(result.outcomes.iter().all(|o| !o.succeeded()));
    }

    #[tokio::test]
    async fn missing_session_is_rejected_before_pool() {
        let orch = orchestrator(MockPool::default());
        let req = request("SOL", "1", &[2]);

        let err = orch
            .transfer(&addr(1), &MockSigner, None, &req)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::EncryptionNotInitialized));
        assert!(orch.pool().calls().is_empty());
    }

    #[tokio::test]
    async fn bad_recipient_reports_index() {
        let orch = orchestrator(MockPool::default());
        let req = TransferRequest {
            token: "SOL".into(),
            amount: "1".into(),
            recipients: vec![addr_str(2), "not-an-address!".into(), addr_str(3)],
        };

        let err = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap_err();

        match err {
            TransferError::InvalidRecipient { index, address, .. } => {
                assert_eq!(index, 1);
                assert_eq!(address, "not-an-address!");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(orch.pool().calls().is_empty());
    }

    #[tokio::test]
    async fn recipient_count_bounds() {
        let orch = orchestrator(MockPool::default());

        let err = orch
            .transfer(
                &addr(1),
                &MockSigner,
                Some(&session()),
                &request("SOL", "1", &[]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidRecipientCount(0)));

        let err = orch
            .transfer(
                &addr(1),
                &MockSigner,
                Some(&session()),
                &request("SOL", "6", &[2, 3, 4, 5, 6, 7]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidRecipientCount(6)));
        assert!(orch.pool().calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let orch = orchestrator(MockPool::default());
        let err = orch
            .transfer(
                &addr(1),
                &MockSigner,
                Some(&session()),
                &request("DOGE", "1", &[2]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::UnknownToken(_)));
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let orch = orchestrator(MockPool::default());
        let err = orch
            .transfer(
                &addr(1),
                &MockSigner,
                Some(&session()),
                &request("SOL", "0", &[2]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidAmount(..)));
    }

    #[tokio::test]
    async fn token_transfer_uses_mint_calls() {
        let orch = orchestrator(MockPool::default());
        let req = request("USDC", "10", &[2, 3]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::Completed);

        let usdc_mint = veilpay_pool::token::USDC.mint_address().unwrap().unwrap();
        let calls = orch.pool().calls();
        assert_eq!(
            calls[0],
            Call::Deposit {
                amount: 10_000_000,
                mint: Some(usdc_mint)
            }
        );
        for call in &calls[1..] {
            match call {
                Call::Withdraw { amount, mint, .. } => {
                    assert_eq!(*amount, 5_000_000);
                    assert_eq!(*mint, Some(usdc_mint));
                }
                other => panic!("unexpected call: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn split_remainder_stays_shielded() {
        let orch = orchestrator(MockPool::default());
        // 100 lamports across 3 recipients: 33 each, 1 left shielded
        let req = request("SOL", "0.0000001", &[2, 3, 4]);

        let result = orch
            .transfer(&addr(1), &MockSigner, Some(&session()), &req)
            .await
            .unwrap();
        assert_eq!(result.status, TransferStatus::Completed);

        let calls = orch.pool().calls();
        let mut withdrawn = 0u64;
        for call in &calls[1..] {
            match call {
                Call::Withdraw { amount, .. } => {
                    assert_eq!(*amount, 33);
                    withdrawn += amount;
                }
                other => panic!("unexpected call: {:?}", other),
            }
        }
        assert_eq!(100 - withdrawn, 100 % 3);
    }
}
