//! # anchor-cli -- `route-anchor` Command-Line Tool
//!
//! Front end for the anchoring workspace.
//!
//! ## Subcommands
//!
//! - `route-anchor hash` -- Print a decision's anchor record and hash (offline).
//! - `route-anchor anchor` -- Anchor one decision.
//! - `route-anchor batch` -- Anchor a JSON array of alternatives, paced.
//! - `route-anchor verify` -- Check a transaction reference on the ledger.
//! - `route-anchor status` -- Show account address, network, balance, frozen flag.
//! - `route-anchor credentials init|show` -- Manage the local credential file.
//!
//! ```bash
//! route-anchor credentials init --handle ops-bot --network devnet
//! route-anchor anchor --id route-42 --cost 1523.5 --score 87.5 --audit-log audit.jsonl
//! route-anchor --disabled batch alternatives.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` error, `2` the command ran but the outcome is negative.

pub mod anchor;
pub mod audit;
pub mod context;
pub mod credentials;
pub mod decision;
