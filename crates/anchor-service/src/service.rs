//! # Anchor Service
//!
//! Orchestrates one anchor attempt:
//!
//! ```text
//! Disabled ──────────────────────────────────────────────> failed receipt
//! Enabled ─> hash ─> fetch account ─> submit ─> confirm ─> anchored receipt
//!                        │ frozen        │          │
//!                        └───────────────┴──────────┴────> failed receipt
//! ```
//!
//! There is no retry inside an attempt: submission is irreversible, and a
//! confirmation timeout is reported as ambiguous so the caller re-verifies
//! instead of resubmitting.

use std::sync::Arc;
use std::time::Instant;

use anchor_core::{
    lamports_to_sol, AnchorReceipt, AnchorRecord, DecisionRecord, FailureKind, Network,
    DISABLED_MESSAGE,
};
use anchor_ledger::LedgerClient;
use anchor_signer::RemoteSigner;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AnchorConfig;
use crate::error::AnchorError;
use crate::metrics::AnchorMetrics;
use crate::rate::RatePolicy;

/// Read-through view of the anchoring account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorStatus {
    /// Whether this service instance anchors at all.
    pub enabled: bool,
    /// Public address of the account.
    pub address: String,
    /// Ledger network the account lives on.
    pub network: Network,
    /// Balance in SOL.
    pub balance: f64,
    /// Balance in lamports.
    pub balance_lamports: u64,
    /// Whether the signing service has frozen the account.
    pub frozen: bool,
}

/// Anchors decision records on the ledger through a custodial signer.
///
/// Attempts on one instance are serialized; callers sharing an
/// `Arc<AnchorService>` never interleave submissions on the account.
pub struct AnchorService {
    signer: Arc<dyn RemoteSigner>,
    ledger: Arc<dyn LedgerClient>,
    config: AnchorConfig,
    rate: RatePolicy,
    metrics: AnchorMetrics,
    gate: Mutex<()>,
}

impl AnchorService {
    /// Build a service. Pacing uses `config.min_interval` with the tokio timer.
    pub fn new(
        signer: Arc<dyn RemoteSigner>,
        ledger: Arc<dyn LedgerClient>,
        config: AnchorConfig,
    ) -> Self {
        Self {
            signer,
            ledger,
            rate: RatePolicy::new(config.min_interval),
            config,
            metrics: AnchorMetrics::new(),
            gate: Mutex::new(()),
        }
    }

    /// Replace the batch pacing policy.
    pub fn with_rate_policy(mut self, rate: RatePolicy) -> Self {
        self.rate = rate;
        self
    }

    /// Attach externally owned counters.
    pub fn with_metrics(mut self, metrics: AnchorMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Configuration this service was built with.
    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Outcome counters.
    pub fn metrics(&self) -> &AnchorMetrics {
        &self.metrics
    }

    /// Fetch status once and log it. A frozen account is reported, not fatal.
    pub async fn initialize(&self) -> Result<AnchorStatus, AnchorError> {
        let status = self.status().await?;
        tracing::info!(
            enabled = status.enabled,
            network = %status.network,
            address = %status.address,
            balance_sol = status.balance,
            frozen = status.frozen,
            "anchor service initialized"
        );
        if status.frozen {
            tracing::warn!(
                address = %status.address,
                "anchoring account is frozen; anchor attempts will fail until it is unfrozen"
            );
        }
        Ok(status)
    }

    /// Anchor one decision. Never fails: every outcome is a receipt.
    pub async fn anchor_decision(&self, decision: &DecisionRecord) -> AnchorReceipt {
        let _guard = self.gate.lock().await;
        self.attempt(decision).await
    }

    /// Anchor each decision in order, pausing between attempts.
    ///
    /// Returns one receipt per input, in input order. A failed slot does not
    /// stop the batch. The instance lock is held for the whole batch.
    pub async fn anchor_alternatives(&self, decisions: &[DecisionRecord]) -> Vec<AnchorReceipt> {
        let _guard = self.gate.lock().await;
        let mut receipts = Vec::with_capacity(decisions.len());
        for (i, decision) in decisions.iter().enumerate() {
            if i > 0 && self.config.enabled {
                self.rate.pause().await;
            }
            receipts.push(self.attempt(decision).await);
        }
        let anchored = receipts.iter().filter(|r| r.success()).count();
        tracing::info!(
            total = receipts.len(),
            anchored,
            failed = receipts.len() - anchored,
            "batch anchor finished"
        );
        receipts
    }

    /// Whether `reference` resolves on the ledger.
    ///
    /// Not-found and lookup failures both return `false`.
    pub async fn verify_decision(&self, reference: &str) -> bool {
        if reference.trim().is_empty() {
            return false;
        }
        match self.ledger.lookup(reference).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%reference, error = %e, "verification lookup failed");
                false
            }
        }
    }

    /// Current account state, read through from the signer and the ledger.
    pub async fn status(&self) -> Result<AnchorStatus, AnchorError> {
        let account = self.signer.fetch_account(self.signer.handle()).await?;
        let lamports = self.ledger.balance(&account.address).await?;
        Ok(AnchorStatus {
            enabled: self.config.enabled,
            address: account.address,
            network: account.network,
            balance: lamports_to_sol(lamports),
            balance_lamports: lamports,
            frozen: account.frozen,
        })
    }

    async fn attempt(&self, decision: &DecisionRecord) -> AnchorReceipt {
        let attempt_id = Uuid::new_v4();
        let record = AnchorRecord::from_decision(decision);

        if !self.config.enabled {
            self.metrics.record_disabled();
            tracing::info!(
                %attempt_id,
                decision_id = %record.decision_id,
                "anchoring disabled; attempt skipped"
            );
            return AnchorReceipt::failed(
                attempt_id,
                record,
                FailureKind::Disabled,
                DISABLED_MESSAGE,
            );
        }

        self.metrics.record_attempt();
        let started = Instant::now();
        tracing::info!(
            %attempt_id,
            decision_id = %record.decision_id,
            decision_hash = %record.decision_hash.short(16),
            "anchor attempt started"
        );

        match self.submit_and_confirm().await {
            Ok((reference, network)) => {
                self.metrics.record_anchored();
                tracing::info!(
                    %attempt_id,
                    decision_id = %record.decision_id,
                    %reference,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "anchor attempt succeeded"
                );
                AnchorReceipt::anchored(attempt_id, record, reference, network)
            }
            Err(err) => {
                let kind = err.kind();
                self.metrics.record_failure(kind);
                tracing::warn!(
                    %attempt_id,
                    decision_id = %record.decision_id,
                    %kind,
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "anchor attempt failed"
                );
                match err.unconfirmed_reference() {
                    Some(reference) => AnchorReceipt::unconfirmed(
                        attempt_id,
                        record,
                        reference.to_string(),
                        err.to_string(),
                    ),
                    None => AnchorReceipt::failed(attempt_id, record, kind, err.to_string()),
                }
            }
        }
    }

    async fn submit_and_confirm(&self) -> Result<(String, Network), AnchorError> {
        let account = self.signer.fetch_account(self.signer.handle()).await?;
        if account.frozen {
            return Err(AnchorError::AccountFrozen {
                handle: account.handle,
            });
        }
        let reference = self
            .signer
            .submit_self_transfer(&account, self.config.transfer_amount)
            .await?;
        self.ledger
            .await_confirmation(&reference, self.config.finality, &self.config.confirmation)
            .await?;
        Ok((reference, account.network))
    }
}

impl std::fmt::Debug for AnchorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorService")
            .field("handle", &self.signer.handle())
            .field("config", &self.config)
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}
