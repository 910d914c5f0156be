//! Ledger client error types.

use anchor_core::FailureKind;

/// Errors from ledger RPC calls.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The RPC endpoint could not be reached or answered non-2xx.
    #[error("ledger transport error calling {method}: {reason}")]
    Transport { method: String, reason: String },
    /// The node answered with a JSON-RPC error object.
    #[error("ledger RPC {method} returned error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    /// The node answered with a body that does not match the method's schema.
    #[error("failed to decode {method} response: {reason}")]
    Decode { method: String, reason: String },
    /// Confirmation was not observed within the wait bound.
    #[error("transaction {reference} not confirmed within {waited_ms} ms")]
    ConfirmationTimeout { reference: String, waited_ms: u64 },
    /// The ledger recorded the transaction as failed.
    #[error("transaction {reference} failed on-chain: {reason}")]
    TransactionFailed { reference: String, reason: String },
}

impl LedgerError {
    /// Audit classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::Rpc { .. } | Self::Decode { .. } => {
                FailureKind::UpstreamUnavailable
            }
            Self::ConfirmationTimeout { .. } => FailureKind::ConfirmationTimeout,
            Self::TransactionFailed { .. } => FailureKind::TransactionFailed,
        }
    }
}
