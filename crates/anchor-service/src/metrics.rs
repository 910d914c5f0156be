//! # Anchor Metrics
//!
//! In-process atomic counters for anchor outcomes. Clones share the same
//! counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anchor_core::FailureKind;
use serde::Serialize;

/// Shared anchor counters.
#[derive(Debug, Clone, Default)]
pub struct AnchorMetrics {
    attempts: Arc<AtomicU64>,
    anchored: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    disabled: Arc<AtomicU64>,
    frozen_rejections: Arc<AtomicU64>,
}

/// Point-in-time copy of [`AnchorMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Attempts that reached the network (disabled attempts excluded).
    pub attempts: u64,
    /// Attempts confirmed on the ledger.
    pub anchored: u64,
    /// Attempts that ended in a failure receipt, frozen rejections included.
    pub failed: u64,
    /// Attempts short-circuited because anchoring is disabled.
    pub disabled: u64,
    /// Attempts refused because the account was frozen.
    pub frozen_rejections: u64,
}

impl AnchorMetrics {
    /// Create a zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_anchored(&self) {
        self.anchored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disabled(&self) {
        self.disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, kind: FailureKind) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        if kind == FailureKind::AccountFrozen {
            self.frozen_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Read all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            anchored: self.anchored.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            disabled: self.disabled.load(Ordering::Relaxed),
            frozen_rejections: self.frozen_rejections.load(Ordering::Relaxed),
        }
    }
}
