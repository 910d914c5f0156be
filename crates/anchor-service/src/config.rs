//! Anchor service configuration.

use std::time::Duration;

use anchor_core::Finality;
use anchor_ledger::ConfirmationPolicy;

/// Default pause between attempt starts in a batch.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Lamports moved by each self-transfer.
pub const DEFAULT_TRANSFER_LAMPORTS: u64 = 1;

/// Explicit settings for one [`AnchorService`](crate::AnchorService).
///
/// Every value is passed at construction; nothing is read from process
/// state after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorConfig {
    /// When false, every attempt returns a "disabled" receipt without any
    /// network traffic.
    pub enabled: bool,
    /// Minimum interval between attempt starts in a batch.
    pub min_interval: Duration,
    /// Finality the ledger must report before an anchor counts as confirmed.
    pub finality: Finality,
    /// Bound on each confirmation wait, passed to the ledger client per call.
    pub confirmation: ConfirmationPolicy,
    /// Self-transfer amount in lamports.
    pub transfer_amount: u64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: DEFAULT_MIN_INTERVAL,
            finality: Finality::Confirmed,
            confirmation: ConfirmationPolicy::default(),
            transfer_amount: DEFAULT_TRANSFER_LAMPORTS,
        }
    }
}

impl AnchorConfig {
    /// Defaults with anchoring switched off (demo mode).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the batch pacing interval.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Override the confirmation wait bound.
    pub fn with_confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    /// Override the required finality.
    pub fn with_finality(mut self, finality: Finality) -> Self {
        self.finality = finality;
        self
    }
}
