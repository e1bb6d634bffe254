//! Shielded Pool Boundary
//!
//! Strongly-typed capability surface for the external shielded pool and
//! the payer's wallet. The pool owns all cryptography (commitments,
//! proofs, note encryption); this crate only defines the types and traits
//! the transfer orchestrator sequences calls against.

pub mod address;
pub mod amount;
pub mod client;
pub mod token;
pub mod wallet;

pub use address::{Address, AddressError};
pub use amount::{AmountError, from_base_units, to_base_units};
pub use client::{EncryptionKey, KeyDeriver, PoolError, SIGNATURE_LEN, SettlementRef, ShieldedPool};
pub use token::Token;
pub use wallet::{MessageSigner, SignerError, TransactionSigner};
