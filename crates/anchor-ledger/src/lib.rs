//! # anchor-ledger -- Ledger Network Adapter
//!
//! Confirmation and lookup against the ledger that carries anchor
//! transactions. Submission goes through the custodial signer; this crate
//! only observes.
//!
//! - [`LedgerClient`]: the capability set the anchor service depends on.
//! - [`RpcLedger`]: Solana JSON-RPC implementation over `reqwest`.
//! - [`ConfirmationPolicy`]: the bound on confirmation waits.

pub mod config;
pub mod error;
pub mod rpc;

pub use config::{ConfirmationPolicy, RpcConfig, RpcConfigError};
pub use error::LedgerError;
pub use rpc::RpcLedger;

use anchor_core::Finality;
use async_trait::async_trait;

/// Read/confirm operations against the ledger network.
///
/// Implementations must be `Send + Sync` and object-safe.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Wait until `reference` reaches `finality`.
    ///
    /// The whole wait, in-flight requests included, is bounded by
    /// `policy.timeout`: fails with [`LedgerError::ConfirmationTimeout`] when
    /// it elapses, and with [`LedgerError::TransactionFailed`] when the
    /// ledger recorded the transaction as errored.
    async fn await_confirmation(
        &self,
        reference: &str,
        finality: Finality,
        policy: &ConfirmationPolicy,
    ) -> Result<(), LedgerError>;

    /// Whether `reference` resolves to a queryable transaction.
    ///
    /// Not-found is `Ok(false)`; errors mean the question could not be asked.
    async fn lookup(&self, reference: &str) -> Result<bool, LedgerError>;

    /// Balance of `address` in lamports.
    async fn balance(&self, address: &str) -> Result<u64, LedgerError>;
}
