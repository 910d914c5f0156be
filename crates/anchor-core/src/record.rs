//! # Decision, Anchor Record and Receipt
//!
//! [`DecisionRecord`] is the caller's input. [`AnchorRecord`] is the payload
//! committed to the audit trail, built once per attempt from a decision.
//! [`AnchorReceipt`] wraps the record with the attempt outcome and is what a
//! caller persists to its audit sink.
//!
//! The record inside a receipt is identical whether the attempt succeeded or
//! failed, so a failed attempt can be retried with the same inputs and the
//! hashes compared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::hasher::{decision_hash, DecisionHash, HASH_VERSION};
use crate::network::Network;
use crate::temporal::DecisionTimestamp;

/// Error text carried by receipts produced while anchoring is switched off.
pub const DISABLED_MESSAGE: &str = "Anchoring disabled";

/// Placeholder for an endpoint the caller did not supply.
const UNKNOWN_ENDPOINT: &str = "Unknown";

// -- DecisionRecord -----------------------------------------------------------

/// An automated decision to be anchored.
///
/// `cost` and `score` are the evaluated values that enter the decision hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecisionRecord")]
pub struct DecisionRecord {
    id: String,
    label: String,
    origin: String,
    destination: String,
    cost: f64,
    score: f64,
    duration_hours: f64,
    decided_at: DecisionTimestamp,
}

impl DecisionRecord {
    /// Start building a decision with the given identifier.
    pub fn builder(id: impl Into<String>) -> DecisionRecordBuilder {
        DecisionRecordBuilder {
            id: id.into(),
            label: String::new(),
            origin: None,
            destination: None,
            cost: 0.0,
            score: 0.0,
            duration_hours: 0.0,
            decided_at: None,
        }
    }

    /// Opaque decision identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Origin endpoint.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Destination endpoint.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Evaluated cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Evaluated safety/quality score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Estimated duration in hours.
    pub fn duration_hours(&self) -> f64 {
        self.duration_hours
    }

    /// When the decision was taken.
    pub fn decided_at(&self) -> DecisionTimestamp {
        self.decided_at
    }

    /// The decision hash over `(id, cost, score, decided_at)`.
    pub fn hash(&self) -> DecisionHash {
        decision_hash(
            &self.id,
            self.cost,
            self.score,
            &self.decided_at.to_canonical_string(),
        )
    }
}

/// Builder for [`DecisionRecord`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DecisionRecordBuilder {
    id: String,
    label: String,
    origin: Option<String>,
    destination: Option<String>,
    cost: f64,
    score: f64,
    duration_hours: f64,
    decided_at: Option<DecisionTimestamp>,
}

impl DecisionRecordBuilder {
    /// Human-readable label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Origin endpoint. Defaults to `"Unknown"`.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Destination endpoint. Defaults to `"Unknown"`.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Evaluated cost.
    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Evaluated safety/quality score.
    pub fn score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Estimated duration in hours.
    pub fn duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Decision time. Defaults to the time [`build`](Self::build) is called.
    pub fn decided_at(mut self, at: impl Into<DecisionTimestamp>) -> Self {
        self.decided_at = Some(at.into());
        self
    }

    /// Validate and freeze the decision.
    pub fn build(self) -> Result<DecisionRecord, ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyDecisionId);
        }
        for (field, value) in [
            ("cost", self.cost),
            ("score", self.score),
            ("duration_hours", self.duration_hours),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
        }
        Ok(DecisionRecord {
            id: self.id,
            label: self.label,
            origin: self.origin.unwrap_or_else(|| UNKNOWN_ENDPOINT.to_string()),
            destination: self
                .destination
                .unwrap_or_else(|| UNKNOWN_ENDPOINT.to_string()),
            cost: self.cost,
            score: self.score,
            duration_hours: self.duration_hours,
            decided_at: self.decided_at.unwrap_or_else(DecisionTimestamp::now),
        })
    }
}

/// Wire shape of a decision; validated through the builder.
#[derive(Deserialize)]
struct RawDecisionRecord {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    cost: f64,
    score: f64,
    #[serde(default)]
    duration_hours: f64,
    #[serde(default)]
    decided_at: Option<DecisionTimestamp>,
}

impl TryFrom<RawDecisionRecord> for DecisionRecord {
    type Error = ValidationError;

    fn try_from(raw: RawDecisionRecord) -> Result<Self, Self::Error> {
        let mut builder = DecisionRecord::builder(raw.id)
            .label(raw.label)
            .cost(raw.cost)
            .score(raw.score)
            .duration_hours(raw.duration_hours);
        if let Some(origin) = raw.origin {
            builder = builder.origin(origin);
        }
        if let Some(destination) = raw.destination {
            builder = builder.destination(destination);
        }
        if let Some(at) = raw.decided_at {
            builder = builder.decided_at(at);
        }
        builder.build()
    }
}

// -- AnchorRecord -------------------------------------------------------------

/// The payload committed to the audit trail for one anchor attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Decision identifier.
    pub decision_id: String,
    /// Decision label.
    pub label: String,
    /// Origin endpoint.
    pub origin: String,
    /// Destination endpoint.
    pub destination: String,
    /// Evaluated cost.
    pub cost: f64,
    /// Evaluated score.
    pub score: f64,
    /// Estimated duration in hours.
    pub duration_hours: f64,
    /// Decision time, exactly as hashed.
    pub decided_at: DecisionTimestamp,
    /// Hash over `(decision_id, cost, score, decided_at)`.
    pub decision_hash: DecisionHash,
    /// Canonical-string layout version used for `decision_hash`.
    pub hash_version: String,
}

impl AnchorRecord {
    /// Build the record for a decision, computing its hash.
    pub fn from_decision(decision: &DecisionRecord) -> Self {
        Self {
            decision_id: decision.id.clone(),
            label: decision.label.clone(),
            origin: decision.origin.clone(),
            destination: decision.destination.clone(),
            cost: decision.cost,
            score: decision.score,
            duration_hours: decision.duration_hours,
            decided_at: decision.decided_at,
            decision_hash: decision.hash(),
            hash_version: HASH_VERSION.to_string(),
        }
    }

    /// Recompute the hash from the record's own fields and compare.
    pub fn hash_matches(&self) -> bool {
        decision_hash(
            &self.decision_id,
            self.cost,
            self.score,
            &self.decided_at.to_canonical_string(),
        ) == self.decision_hash
    }
}

// -- FailureKind --------------------------------------------------------------

/// Machine-readable reason an anchor attempt did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service is in disabled (demo) mode.
    Disabled,
    /// Transport or upstream server failure.
    UpstreamUnavailable,
    /// The signer does not know the account handle.
    AccountNotFound,
    /// The signer declined to sign.
    SigningRejected,
    /// The signer reported success without a transaction reference.
    NoReferenceReturned,
    /// Submitted, but confirmation was not observed in time.
    ConfirmationTimeout,
    /// The ledger reports the transaction as failed.
    TransactionFailed,
    /// The account is frozen; nothing was submitted.
    AccountFrozen,
}

impl FailureKind {
    /// A fresh attempt may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable)
    }

    /// The transaction may exist on-chain. Re-verify before resubmitting.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::AccountNotFound => "account_not_found",
            Self::SigningRejected => "signing_rejected",
            Self::NoReferenceReturned => "no_reference_returned",
            Self::ConfirmationTimeout => "confirmation_timeout",
            Self::TransactionFailed => "transaction_failed",
            Self::AccountFrozen => "account_frozen",
        };
        f.write_str(s)
    }
}

// -- AnchorReceipt ------------------------------------------------------------

/// Outcome of one anchor attempt.
///
/// `transaction_ref` and `explorer_url` are present iff `success`;
/// `error` and `failure` are present iff `!success`. `unconfirmed_ref` is
/// present only on a [`FailureKind::ConfirmationTimeout`] failure: the
/// submitted reference to re-verify before any resubmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    attempt_id: Uuid,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unconfirmed_ref: Option<String>,
    record: AnchorRecord,
}

impl AnchorReceipt {
    /// A successful, confirmed anchor.
    pub fn anchored(
        attempt_id: Uuid,
        record: AnchorRecord,
        reference: String,
        network: Network,
    ) -> Self {
        Self {
            attempt_id,
            success: true,
            explorer_url: Some(network.explorer_tx_url(&reference)),
            transaction_ref: Some(reference),
            error: None,
            failure: None,
            unconfirmed_ref: None,
            record,
        }
    }

    /// A failed attempt. The record is kept for audit and retry comparison.
    pub fn failed(
        attempt_id: Uuid,
        record: AnchorRecord,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            attempt_id,
            success: false,
            transaction_ref: None,
            explorer_url: None,
            error: Some(message.into()),
            failure: Some(kind),
            unconfirmed_ref: None,
            record,
        }
    }

    /// Submitted under `reference`, but confirmation was not observed in
    /// time. The transaction may still land.
    pub fn unconfirmed(
        attempt_id: Uuid,
        record: AnchorRecord,
        reference: String,
        message: impl Into<String>,
    ) -> Self {
        Self {
            unconfirmed_ref: Some(reference),
            ..Self::failed(attempt_id, record, FailureKind::ConfirmationTimeout, message)
        }
    }

    /// Identifier correlating this receipt with its log events.
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Whether the anchor was submitted and confirmed.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Ledger transaction reference.
    pub fn transaction_ref(&self) -> Option<&str> {
        self.transaction_ref.as_deref()
    }

    /// Block-explorer link for the transaction.
    pub fn explorer_url(&self) -> Option<&str> {
        self.explorer_url.as_deref()
    }

    /// Human-readable failure description.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Machine-readable failure kind.
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Reference submitted but never seen confirmed.
    pub fn unconfirmed_ref(&self) -> Option<&str> {
        self.unconfirmed_ref.as_deref()
    }

    /// The record that was attempted.
    pub fn record(&self) -> &AnchorRecord {
        &self.record
    }
}
