//! Batch pacing.
//!
//! The pause between batch attempts is delegated to a [`Sleeper`] so the
//! interval stays a policy value and tests can observe it without waiting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Minimum interval between attempt starts, and how to wait it out.
#[derive(Clone)]
pub struct RatePolicy {
    /// Interval enforced between consecutive attempts.
    pub min_interval: Duration,
    /// Waiting strategy.
    pub sleeper: Arc<dyn Sleeper>,
}

impl RatePolicy {
    /// Policy with the tokio timer.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the waiting strategy.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Wait out one interval. A zero interval returns immediately.
    pub async fn pause(&self) {
        if !self.min_interval.is_zero() {
            self.sleeper.sleep(self.min_interval).await;
        }
    }
}

impl std::fmt::Debug for RatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatePolicy")
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}
