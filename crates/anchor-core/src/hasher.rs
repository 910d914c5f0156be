//! # Decision Hashes
//!
//! Builds the commitment that links an off-chain decision to its on-chain
//! anchor. The canonical string is
//!
//! ```text
//! {id}:{cost}:{score}:{timestamp}
//! ```
//!
//! hashed with SHA-256 over its UTF-8 bytes and rendered as lowercase hex.
//!
//! ## Number Rendering
//!
//! Cost and score use the shortest decimal form that round-trips the `f64`
//! (`1523.50` renders as `1523.5`, `100.0` as `100`). Negative zero renders
//! as `0`. No rounding or locale formatting is applied; callers pass
//! pre-normalised values. Magnitudes in `[1e-6, 1e21)` use plain decimal
//! notation; outside that range the exponent form `1e+21` / `1.5e-7` is
//! used, so every finite value renders exactly as ECMAScript
//! `Number#toString` does.
//!
//! ## Versioning
//!
//! The field order, delimiter and number rendering together form hash
//! version [`HASH_VERSION`]. Changing any of them requires a new version tag.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Version tag of the canonical string layout.
pub const HASH_VERSION: &str = "v1";

/// Field delimiter in the canonical string.
const DELIMITER: char = ':';

/// A 64-character lowercase hex SHA-256 digest of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecisionHash(String);

impl DecisionHash {
    /// Parse a hex digest produced elsewhere (e.g. read back from an audit log).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let well_formed = raw.len() == 64
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidDecisionHash(raw.to_string()))
        }
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` hex characters, for log lines.
    pub fn short(&self, n: usize) -> &str {
        self.0.get(..n).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for DecisionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DecisionHash {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DecisionHash> for String {
    fn from(hash: DecisionHash) -> Self {
        hash.0
    }
}

/// Magnitudes at or above this render in exponent form.
const EXPONENT_ABOVE: f64 = 1e21;

/// Magnitudes below this render in exponent form.
const EXPONENT_BELOW: f64 = 1e-6;

/// Render a number the way it appears in the canonical string.
pub fn canonical_number(value: f64) -> String {
    if value == 0.0 {
        // Covers -0.0, which `Display` renders as "-0".
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude < EXPONENT_BELOW || magnitude >= EXPONENT_ABOVE {
        return exponent_form(value);
    }
    value.to_string()
}

/// `{digits}e{sign}{exponent}` with the shortest round-trip digits and an
/// explicit sign on the exponent.
fn exponent_form(value: f64) -> String {
    let raw = format!("{value:e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => {
            format!("{mantissa}e{exponent}")
        }
        Some((mantissa, exponent)) => format!("{mantissa}e+{exponent}"),
        None => raw,
    }
}

/// Compute the decision hash for `(id, cost, score, timestamp_iso)`.
///
/// The timestamp is used verbatim; pass
/// [`DecisionTimestamp::to_canonical_string`](crate::DecisionTimestamp::to_canonical_string)
/// output to stay reproducible.
pub fn decision_hash(id: &str, cost: f64, score: f64, timestamp_iso: &str) -> DecisionHash {
    let canonical = format!(
        "{id}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{timestamp_iso}",
        canonical_number(cost),
        canonical_number(score),
    );
    let digest = Sha256::digest(canonical.as_bytes());
    DecisionHash(digest.iter().map(|b| format!("{b:02x}")).collect())
}
