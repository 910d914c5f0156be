//! # Anchor Subcommands
//!
//! - `anchor` anchors one decision and prints its receipt.
//! - `batch` anchors a file of alternatives and prints the receipts in order.
//! - `verify` looks a transaction reference up on the ledger.
//! - `status` prints the account state.
//!
//! Receipts go to stdout as JSON and, with `--audit-log`, to the audit file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use anchor_core::AnchorReceipt;
use anchor_service::AnchorService;

use crate::audit::AuditLog;
use crate::decision::{load_batch, DecisionArgs};

/// Exit code when the command ran but the outcome is negative (a failed
/// receipt, an unverified reference).
pub const EXIT_NEGATIVE: u8 = 2;

/// Arguments for `route-anchor batch`.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON file holding an array of decisions.
    pub file: PathBuf,
}

/// Arguments for `route-anchor verify`.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Transaction reference from a receipt.
    pub reference: String,
}

/// Anchor one decision.
pub async fn run_anchor(
    args: &DecisionArgs,
    service: &AnchorService,
    audit: Option<&AuditLog>,
) -> Result<u8> {
    let decision = args.to_decision()?;
    let receipt = service.anchor_decision(&decision).await;
    record(std::slice::from_ref(&receipt), audit)?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(outcome(std::slice::from_ref(&receipt)))
}

/// Anchor every decision in a batch file.
pub async fn run_batch(
    args: &BatchArgs,
    service: &AnchorService,
    audit: Option<&AuditLog>,
) -> Result<u8> {
    let decisions = load_batch(&args.file)?;
    let receipts = service.anchor_alternatives(&decisions).await;
    record(&receipts, audit)?;

    let snap = service.metrics().snapshot();
    tracing::info!(
        attempts = snap.attempts,
        anchored = snap.anchored,
        failed = snap.failed,
        disabled = snap.disabled,
        frozen_rejections = snap.frozen_rejections,
        "batch metrics"
    );

    println!("{}", serde_json::to_string_pretty(&receipts)?);
    Ok(outcome(&receipts))
}

/// Check a reference on the ledger.
pub async fn run_verify(args: &VerifyArgs, service: &AnchorService) -> Result<u8> {
    let verified = service.verify_decision(&args.reference).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "reference": args.reference,
            "verified": verified,
        }))?
    );
    Ok(if verified { 0 } else { EXIT_NEGATIVE })
}

/// Print account status.
pub async fn run_status(service: &AnchorService) -> Result<u8> {
    let status = service.initialize().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(0)
}

fn record(receipts: &[AnchorReceipt], audit: Option<&AuditLog>) -> Result<()> {
    match audit {
        Some(log) => log.append(receipts),
        None => Ok(()),
    }
}

fn outcome(receipts: &[AnchorReceipt]) -> u8 {
    if receipts.iter().all(AnchorReceipt::success) {
        0
    } else {
        EXIT_NEGATIVE
    }
}
