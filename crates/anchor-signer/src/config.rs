//! Signing service client configuration.
//!
//! Configuration is an explicit value handed to [`HttpSigner::new`](crate::HttpSigner::new).
//! It can be built from environment variables, from a credential file, or
//! constructed directly for tests.

use std::str::FromStr;

use anchor_core::Network;
use url::Url;
use zeroize::Zeroizing;

use crate::credentials::Credentials;

/// Production base URL of the custodial signing service.
pub const DEFAULT_BASE_URL: &str = "https://agentwallet.mcpay.tech/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the custodial signing service.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct SignerConfig {
    /// Base URL of the service API (path prefix included).
    pub base_url: Url,
    /// Account handle the token belongs to.
    pub handle: String,
    /// Bearer token for API authentication.
    pub api_token: Zeroizing<String>,
    /// Cluster the account transacts on.
    pub network: Network,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfig")
            .field("base_url", &self.base_url)
            .field("handle", &self.handle)
            .field("api_token", &"[REDACTED]")
            .field("network", &self.network)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SignerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AGENTWALLET_USERNAME` (required)
    /// - `AGENTWALLET_API_TOKEN` (required)
    /// - `AGENTWALLET_NETWORK` (default: `devnet`)
    /// - `AGENTWALLET_API_URL` (default: `https://agentwallet.mcpay.tech/api`)
    /// - `AGENTWALLET_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let handle =
            std::env::var("AGENTWALLET_USERNAME").map_err(|_| ConfigError::MissingHandle)?;
        let api_token =
            std::env::var("AGENTWALLET_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        let network = match std::env::var("AGENTWALLET_NETWORK") {
            Ok(raw) => Network::from_str(&raw)
                .map_err(|e| ConfigError::InvalidNetwork(e.to_string()))?,
            Err(_) => Network::default(),
        };

        Self::new(env_url("AGENTWALLET_API_URL", DEFAULT_BASE_URL)?, handle, api_token, network)
            .map(|cfg| cfg.with_timeout(env_timeout()))
    }

    /// Build configuration from a loaded credential file.
    pub fn from_credentials(creds: &Credentials) -> Result<Self, ConfigError> {
        let base = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| ConfigError::InvalidUrl("default".to_string(), e.to_string()))?;
        Self::new(base, creds.handle.clone(), creds.api_token.clone(), creds.network)
    }

    /// Build and validate a configuration.
    pub fn new(
        base_url: Url,
        handle: impl Into<String>,
        api_token: impl Into<String>,
        network: Network,
    ) -> Result<Self, ConfigError> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            return Err(ConfigError::MissingHandle);
        }
        let api_token = Zeroizing::new(api_token.into());
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if api_token.chars().any(char::is_control) {
            return Err(ConfigError::InvalidToken);
        }
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(
                base_url.to_string(),
                "URL cannot carry a path".to_string(),
            ));
        }
        Ok(Self {
            base_url,
            handle,
            api_token,
            network,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Override the base URL (staging, local mocks).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_timeout() -> u64 {
    std::env::var("AGENTWALLET_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("account handle is required (AGENTWALLET_USERNAME or credential file)")]
    MissingHandle,
    #[error("API token is required (AGENTWALLET_API_TOKEN or credential file)")]
    MissingToken,
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
    #[error("invalid network: {0}")]
    InvalidNetwork(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:9000/api").unwrap()
    }

    #[test]
    fn new_rejects_blank_handle_and_token() {
        assert!(matches!(
            SignerConfig::new(base(), " ", "tok", Network::Devnet),
            Err(ConfigError::MissingHandle)
        ));
        assert!(matches!(
            SignerConfig::new(base(), "ops", "", Network::Devnet),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn new_rejects_token_with_line_break() {
        let err = SignerConfig::new(base(), "ops", "tok\nX-Injected: 1", Network::Devnet).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidToken));
        assert!(!err.to_string().contains("tok"));
    }

    #[test]
    fn new_rejects_cannot_be_a_base_url() {
        let url = Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(
            SignerConfig::new(url, "ops", "tok", Network::Devnet),
            Err(ConfigError::InvalidUrl(..))
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = SignerConfig::new(base(), "ops", "super-secret", Network::Devnet).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn from_credentials_uses_default_base() {
        let creds = Credentials::new("ops", "tok", Network::Testnet);
        let cfg = SignerConfig::from_credentials(&creds).unwrap();
        assert_eq!(cfg.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("NONEXISTENT_VAR_ANCHOR_12345", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("TEST_BAD_URL_ANCHOR", "not a url");
        let result = env_url("TEST_BAD_URL_ANCHOR", "https://example.com");
        std::env::remove_var("TEST_BAD_URL_ANCHOR");
        assert!(result.is_err());
    }
}
