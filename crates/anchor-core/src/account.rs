//! Remote-signer account identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Identity and status of the custodial account that signs anchors.
///
/// Fetched on demand; the core never caches it across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorAccount {
    /// Account handle at the custodial service.
    pub handle: String,
    /// Ledger address (base58 public key).
    pub address: String,
    /// Cluster the account operates on.
    pub network: Network,
    /// Frozen accounts cannot sign; anchor attempts fail fast.
    pub frozen: bool,
    /// Creation time, when the service reports it.
    pub created_at: Option<DateTime<Utc>>,
}
