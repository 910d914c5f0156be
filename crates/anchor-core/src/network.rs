//! # Ledger Networks and Finality
//!
//! The custodial signer and the ledger RPC both address the same fixed set
//! of clusters. Each cluster maps to three strings that differ slightly:
//! the explorer `cluster` query parameter, the signer's transfer `network`
//! tag, and the default public RPC endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert lamports to SOL for display.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Ledger cluster an account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Network {
    /// Development cluster.
    #[default]
    #[serde(rename = "devnet")]
    Devnet,
    /// Test cluster.
    #[serde(rename = "testnet")]
    Testnet,
    /// Production cluster.
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
}

impl Network {
    /// Cluster name as used in explorer URLs and credential files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
        }
    }

    /// Tag expected by the signer's transfer action.
    pub fn transfer_tag(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet",
        }
    }

    /// Public JSON-RPC endpoint for this cluster.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Explorer link for a transaction reference.
    pub fn explorer_tx_url(&self, reference: &str) -> String {
        format!(
            "https://explorer.solana.com/tx/{reference}?cluster={}",
            self.as_str()
        )
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            other => Err(ValidationError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Confidence level that a transaction will not be reverted.
///
/// Ordered: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    /// Seen by the connected node.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted; cannot be rolled back.
    Finalized,
}

impl Finality {
    /// Commitment string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Finality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Finality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(ValidationError::UnknownFinality(other.to_string())),
        }
    }
}
