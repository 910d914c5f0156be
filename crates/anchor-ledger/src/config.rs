//! Ledger RPC configuration.

use std::time::Duration;

use anchor_core::Network;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bounded wait policy for confirmation polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Give up after this long.
    pub timeout: Duration,
    /// Pause between status polls.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl ConfirmationPolicy {
    /// Defaults, with the timeout overridden by `ANCHOR_CONFIRM_TIMEOUT_SECS`
    /// when it holds a whole number of seconds.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(secs) = std::env::var("ANCHOR_CONFIRM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            policy.timeout = Duration::from_secs(secs);
        }
        policy
    }
}

/// Configuration for the JSON-RPC ledger client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint.
    pub endpoint: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl RpcConfig {
    /// Public endpoint for `network` with default timeouts.
    pub fn for_network(network: Network) -> Result<Self, RpcConfigError> {
        let endpoint = Url::parse(network.default_rpc_url())
            .map_err(|e| RpcConfigError::InvalidUrl(network.to_string(), e.to_string()))?;
        Ok(Self::new(endpoint))
    }

    /// Explicit endpoint with default timeouts.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from `ANCHOR_RPC_URL`, falling back to the network's public
    /// endpoint.
    pub fn from_env(network: Network) -> Result<Self, RpcConfigError> {
        match std::env::var("ANCHOR_RPC_URL") {
            Ok(raw) => Ok(Self::new(Url::parse(&raw).map_err(|e| {
                RpcConfigError::InvalidUrl("ANCHOR_RPC_URL".into(), e.to_string())
            })?)),
            Err(_) => Self::for_network(network),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum RpcConfigError {
    #[error("invalid RPC URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_defaults() {
        let cfg = RpcConfig::for_network(Network::Testnet).unwrap();
        assert_eq!(cfg.endpoint.as_str(), "https://api.testnet.solana.com/");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn default_policy_is_bounded() {
        let p = ConfirmationPolicy::default();
        assert_eq!(p.timeout, Duration::from_secs(30));
        assert!(p.poll_interval < p.timeout);
    }

    #[test]
    fn policy_from_env_without_override_is_default() {
        std::env::remove_var("ANCHOR_CONFIRM_TIMEOUT_SECS");
        assert_eq!(ConfirmationPolicy::from_env(), ConfirmationPolicy::default());
    }
}
