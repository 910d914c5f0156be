//! Signing service error types.

use anchor_core::FailureKind;

/// Errors from signing service calls.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// Transport failure, 5xx, or a response that does not match the schema.
    #[error("signing service unavailable at {endpoint}: {reason}")]
    UpstreamUnavailable { endpoint: String, reason: String },
    /// The service reports no account under this handle.
    #[error("account not found: {handle}")]
    AccountNotFound { handle: String },
    /// The service declined to sign (insufficient funds, frozen, policy).
    #[error("signing rejected by {endpoint} ({status}): {body}")]
    SigningRejected {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The service answered 2xx without a usable transaction reference.
    #[error("no transaction reference returned by {endpoint}: {detail}")]
    NoReferenceReturned { endpoint: String, detail: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl SignerError {
    /// Audit classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UpstreamUnavailable { .. } | Self::Config(_) => FailureKind::UpstreamUnavailable,
            Self::AccountNotFound { .. } => FailureKind::AccountNotFound,
            Self::SigningRejected { .. } => FailureKind::SigningRejected,
            Self::NoReferenceReturned { .. } => FailureKind::NoReferenceReturned,
        }
    }
}
