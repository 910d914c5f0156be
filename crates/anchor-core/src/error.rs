//! # Validation Errors
//!
//! Construction-time errors for the domain types in this crate. Each variant
//! carries the rejected input so operators can see exactly what was refused.

use thiserror::Error;

/// Errors raised while constructing or parsing core domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Decision identifiers are part of the hash input and must not be empty.
    #[error("decision id must not be empty")]
    EmptyDecisionId,

    /// A numeric field was NaN or infinite.
    #[error("{field} must be a finite number, got {value}")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Timestamp is not a valid RFC 3339 / ISO-8601 instant.
    #[error("invalid decision timestamp \"{0}\" (expected ISO-8601, e.g. 2024-01-01T00:00:00.000Z)")]
    InvalidTimestamp(String),

    /// Decision hash is not 64 lowercase hex characters.
    #[error("invalid decision hash \"{0}\" (expected 64 lowercase hex characters)")]
    InvalidDecisionHash(String),

    /// Network tag is not one of the supported clusters.
    #[error("unknown network \"{0}\" (expected devnet, testnet or mainnet-beta)")]
    UnknownNetwork(String),

    /// Finality level is not recognised.
    #[error("unknown finality \"{0}\" (expected processed, confirmed or finalized)")]
    UnknownFinality(String),
}
