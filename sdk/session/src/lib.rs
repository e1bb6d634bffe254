//! Signature-Derived Key Sessions
//!
//! One wallet signature over a fixed sign-in message yields a stable
//! per-identity encryption key: the key is a deterministic function of
//! (address, wallet signing key), so the same wallet reproduces it
//! across sessions and no secret state is ever persisted.
//!
//! Sessions live only in this process's memory and are destroyed when
//! the manager drops or [`SessionManager::end`] is called.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use veilpay_pool::{Address, EncryptionKey, KeyDeriver, MessageSigner, SIGNATURE_LEN, SignerError};

/// Canonical message every wallet signs to derive its key.
///
/// Constant and identity-independent: changing it would silently rotate
/// every user's key and orphan their shielded notes.
pub const SIGN_IN_MESSAGE: &[u8] = b"Privacy Money account sign in";

#[derive(Debug, Error)]
pub enum SessionError {
    /// The user declined the wallet prompt. Retryable by re-invoking.
    #[error("user rejected the sign-in request; approve the signature prompt in your wallet to continue")]
    UserRejected,
    #[error("wallet failed to sign the sign-in message: {0}")]
    SigningFailed(String),
    #[error("wallet returned a {0}-byte signature, expected {SIGNATURE_LEN}")]
    MalformedSignature(usize),
}

/// An established per-identity key session.
///
/// Read-only once created; safe to share across concurrent transfer
/// attempts by the same identity.
#[derive(Clone)]
pub struct KeySession {
    address: Address,
    key: EncryptionKey,
}

impl KeySession {
    pub fn new(address: Address, key: EncryptionKey) -> Self {
        Self { address, key }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn key(&self) -> &EncryptionKey {
        &self.key
    }
}

impl fmt::Debug for KeySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySession")
            .field("address", &self.address)
            .finish_non_exhaustive() // Hides the key field
    }
}

/// In-memory cache of key sessions, keyed by wallet address.
pub struct SessionManager {
    sessions: DashMap<Address, Arc<KeySession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Returns the cached session for `address`, if one exists.
    pub fn get(&self, address: &Address) -> Option<Arc<KeySession>> {
        self.sessions.get(address).map(|entry| entry.clone())
    }

    /// Establishes a key session for `address`.
    ///
    /// Idempotent: an already-established session is returned as-is, so
    /// retrying this call never re-prompts the wallet once it has
    /// succeeded.
    pub async fn initialize<S, D>(
        &self,
        address: Address,
        signer: &S,
        deriver: &D,
    ) -> Result<Arc<KeySession>, SessionError>
    where
        S: MessageSigner,
        D: KeyDeriver,
    {
        if let Some(existing) = self.get(&address) {
            return Ok(existing);
        }

        let raw = signer
            .sign_message(SIGN_IN_MESSAGE)
            .await
            .map_err(|e| match e {
                SignerError::Rejected => SessionError::UserRejected,
                SignerError::Failed(cause) => SessionError::SigningFailed(cause),
            })?;

        let signature: [u8; SIGNATURE_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| SessionError::MalformedSignature(raw.len()))?;

        let session = Arc::new(KeySession::new(address, deriver.derive_key(&signature)));
        self.sessions.insert(address, session.clone());
        Ok(session)
    }

    /// Destroys the session for `address`, if any.
    pub fn end(&self, address: &Address) {
        self.sessions.remove(address);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
