//! # Decision Input
//!
//! Decisions come either from flags (`--id --cost --score ...`) or from a
//! JSON file. Batch files hold a JSON array of the same objects:
//!
//! ```json
//! [{"id": "route-42", "label": "Sea via Suez", "origin": "Shanghai",
//!   "destination": "Rotterdam", "cost": 1523.5, "score": 87.5,
//!   "duration_hours": 720, "decided_at": "2024-01-01T00:00:00.000Z"}]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use anchor_core::{AnchorRecord, DecisionRecord, DecisionTimestamp};

/// One decision, inline or from a file.
#[derive(Args, Debug, Clone)]
pub struct DecisionArgs {
    /// Read the decision from a JSON file instead of flags.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["id", "cost", "score"])]
    pub file: Option<PathBuf>,

    /// Decision identifier.
    #[arg(long, required_unless_present = "file")]
    pub id: Option<String>,

    /// Evaluated cost.
    #[arg(long, required_unless_present = "file")]
    pub cost: Option<f64>,

    /// Evaluated score.
    #[arg(long, required_unless_present = "file")]
    pub score: Option<f64>,

    /// Human-readable label.
    #[arg(long, default_value = "")]
    pub label: String,

    /// Origin endpoint (default: "Unknown").
    #[arg(long)]
    pub origin: Option<String>,

    /// Destination endpoint (default: "Unknown").
    #[arg(long)]
    pub destination: Option<String>,

    /// Estimated duration in hours.
    #[arg(long, default_value_t = 0.0)]
    pub hours: f64,

    /// Decision time, RFC 3339 (default: now).
    #[arg(long, value_name = "RFC3339")]
    pub decided_at: Option<String>,
}

impl DecisionArgs {
    /// Build and validate the decision.
    pub fn to_decision(&self) -> Result<DecisionRecord> {
        if let Some(path) = &self.file {
            return load_decision(path);
        }

        let mut builder = DecisionRecord::builder(self.id.clone().unwrap_or_default())
            .label(self.label.clone())
            .cost(self.cost.unwrap_or_default())
            .score(self.score.unwrap_or_default())
            .duration_hours(self.hours);
        if let Some(origin) = &self.origin {
            builder = builder.origin(origin.clone());
        }
        if let Some(destination) = &self.destination {
            builder = builder.destination(destination.clone());
        }
        if let Some(raw) = &self.decided_at {
            builder = builder.decided_at(DecisionTimestamp::parse(raw)?);
        }
        Ok(builder.build()?)
    }
}

/// Load a single decision object.
pub fn load_decision(path: &Path) -> Result<DecisionRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading decision file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing decision file {}", path.display()))
}

/// Load a JSON array of decisions.
pub fn load_batch(path: &Path) -> Result<Vec<DecisionRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing batch file {}", path.display()))
}

/// `route-anchor hash`: print the anchor record (with its hash) for a
/// decision, without touching the network.
pub fn run_hash(args: &DecisionArgs) -> Result<u8> {
    let decision = args.to_decision()?;
    let record = AnchorRecord::from_decision(&decision);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(0)
}
