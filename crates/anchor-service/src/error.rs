//! Anchor service error taxonomy.
//!
//! Every failure of an anchor attempt collapses into one [`AnchorError`],
//! and every [`AnchorError`] maps to exactly one [`FailureKind`] for the
//! audit receipt. Upstream messages are preserved verbatim in `Display`.

use anchor_core::{FailureKind, DISABLED_MESSAGE};
use anchor_ledger::LedgerError;
use anchor_signer::SignerError;
use thiserror::Error;

/// Errors from anchor operations.
#[derive(Error, Debug)]
pub enum AnchorError {
    /// The service was constructed with anchoring switched off.
    #[error("{}", DISABLED_MESSAGE)]
    Disabled,

    /// The account is frozen and cannot sign.
    #[error("account {handle} is frozen")]
    AccountFrozen {
        /// Handle of the frozen account.
        handle: String,
    },

    /// The custodial signing service failed.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The ledger network failed or did not confirm in time.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AnchorError {
    /// Audit classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Disabled => FailureKind::Disabled,
            Self::AccountFrozen { .. } => FailureKind::AccountFrozen,
            Self::Signer(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }

    /// Reference that was submitted but not seen confirmed, if any.
    pub fn unconfirmed_reference(&self) -> Option<&str> {
        match self {
            Self::Ledger(LedgerError::ConfirmationTimeout { reference, .. }) => Some(reference),
            _ => None,
        }
    }
}
