#![deny(missing_docs)]

//! # anchor-core -- Foundational Types for Decision Anchoring
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies and performs no I/O.
//!
//! ## Design Principles
//!
//! 1. **[`decision_hash`] is a pure function.** The canonical string
//!    `id:cost:score:timestamp` is hashed with SHA-256 and hex-encoded. The
//!    format is versioned by [`HASH_VERSION`]; any change to field order or
//!    number formatting is protocol-breaking.
//!
//! 2. **Records are immutable.** [`DecisionRecord`] is validated at
//!    construction and [`AnchorRecord`] is built once per attempt. Neither
//!    exposes setters.
//!
//! 3. **Receipts uphold their own invariant.** [`AnchorReceipt`] can only be
//!    built through [`AnchorReceipt::anchored`] or [`AnchorReceipt::failed`],
//!    so a transaction reference is present exactly when the attempt succeeded.

pub mod account;
pub mod error;
pub mod hasher;
pub mod network;
pub mod record;
pub mod temporal;

pub use account::AnchorAccount;
pub use error::ValidationError;
pub use hasher::{canonical_number, decision_hash, DecisionHash, HASH_VERSION};
pub use network::{lamports_to_sol, Finality, Network, LAMPORTS_PER_SOL};
pub use record::{
    AnchorReceipt, AnchorRecord, DecisionRecord, DecisionRecordBuilder, FailureKind,
    DISABLED_MESSAGE,
};
pub use temporal::DecisionTimestamp;
