//! # anchor-service -- Decision Anchoring
//!
//! Commits a decision's hash to the ledger through a custodial signer and
//! returns an audit receipt for every attempt, successful or not.
//!
//! ## Crate Policy
//!
//! - The service depends on [`RemoteSigner`](anchor_signer::RemoteSigner) and
//!   [`LedgerClient`](anchor_ledger::LedgerClient) trait objects only.
//! - No retries. Failures become receipts carrying a
//!   [`FailureKind`](anchor_core::FailureKind) and the upstream message.
//! - Attempts on one instance are serialized behind an async mutex.
//! - Batch pacing goes through [`RatePolicy`] so tests never sleep.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rate;
pub mod service;

pub use config::AnchorConfig;
pub use error::AnchorError;
pub use metrics::{AnchorMetrics, MetricsSnapshot};
pub use rate::{RatePolicy, Sleeper, TokioSleeper};
pub use service::{AnchorService, AnchorStatus};
