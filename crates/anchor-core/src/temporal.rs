//! # Decision Timestamps
//!
//! UTC timestamp with millisecond precision. The canonical rendering
//! `YYYY-MM-DDTHH:MM:SS.mmmZ` is part of the decision hash input, so the
//! value is truncated to milliseconds at construction and always renders the
//! same way it parses.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC instant truncated to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecisionTimestamp(DateTime<Utc>);

impl DecisionTimestamp {
    /// The current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a `chrono` instant, dropping sub-millisecond precision.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    /// Parse an RFC 3339 timestamp. Offsets are normalised to UTC.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for DecisionTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for DecisionTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl TryFrom<String> for DecisionTimestamp {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DecisionTimestamp> for String {
    fn from(ts: DecisionTimestamp) -> Self {
        ts.to_canonical_string()
    }
}
