//! # HTTP Client for the Custodial Signing Service
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/wallets/{handle}` | Account identity and status |
//! | POST   | `/wallets/{handle}/actions/transfer` | Sign and broadcast a transfer |
//!
//! ## Response Schemas
//!
//! Responses are decoded against a single schema each. The account response
//! must carry `username` and `solanaAddress`; `frozen` and `createdAt` are
//! optional. The transfer response must carry a non-blank `txHash`. Any other
//! shape fails with [`SignerError::UpstreamUnavailable`] (account) or
//! [`SignerError::NoReferenceReturned`] (transfer) rather than guessing
//! between alternative field names.
//!
//! ## Retries
//!
//! None. A transfer that reached the service may already be on-chain, so
//! the caller owns retry policy.

use std::time::Duration;

use anchor_core::{AnchorAccount, Network};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigError, SignerConfig};
use crate::error::SignerError;
use crate::RemoteSigner;

/// Asset tag for native-currency transfers.
const NATIVE_ASSET: &str = "sol";

// -- Wire types ---------------------------------------------------------------

/// Account as returned by `GET /wallets/{handle}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletResponse {
    username: String,
    solana_address: String,
    #[serde(default)]
    frozen: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /wallets/{handle}/actions/transfer`.
#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    to: &'a str,
    amount: String,
    asset: &'static str,
    network: &'static str,
}

/// Transfer response; only `txHash` is authoritative.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferResponse {
    #[serde(default)]
    tx_hash: Option<String>,
}

// -- Client -------------------------------------------------------------------

/// [`RemoteSigner`] backed by the custodial service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSigner {
    http: reqwest::Client,
    base_url: Url,
    handle: String,
    network: Network,
}

impl HttpSigner {
    /// Create a new client from configuration.
    pub fn new(config: SignerConfig) -> Result<Self, SignerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!(
                        "Bearer {}",
                        config.api_token.as_str()
                    ))
                    .map_err(|_| SignerError::Config(ConfigError::InvalidToken))?,
                );
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| SignerError::UpstreamUnavailable {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            handle: config.handle,
            network: config.network,
        })
    }

    /// Cluster this client signs for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// `{base_url}/wallets/{handle}[/extra...]` with each segment escaped.
    fn wallet_url(&self, handle: &str, extra: &[&str]) -> Result<Url, SignerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SignerError::Config(ConfigError::InvalidUrl(
                    self.base_url.to_string(),
                    "URL cannot carry a path".into(),
                ))
            })?
            .pop_if_empty()
            .push("wallets")
            .push(handle)
            .extend(extra);
        Ok(url)
    }
}

#[async_trait]
impl RemoteSigner for HttpSigner {
    fn handle(&self) -> &str {
        &self.handle
    }

    async fn fetch_account(&self, handle: &str) -> Result<AnchorAccount, SignerError> {
        let endpoint = format!("GET /wallets/{handle}");
        let url = self.wallet_url(handle, &[])?;

        tracing::debug!(%handle, "fetching signer account");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SignerError::UpstreamUnavailable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SignerError::AccountNotFound {
                handle: handle.to_string(),
            });
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SignerError::UpstreamUnavailable {
                endpoint,
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let wallet: WalletResponse =
            resp.json()
                .await
                .map_err(|e| SignerError::UpstreamUnavailable {
                    endpoint: endpoint.clone(),
                    reason: format!("response does not match account schema: {e}"),
                })?;

        if wallet.solana_address.trim().is_empty() {
            return Err(SignerError::UpstreamUnavailable {
                endpoint,
                reason: "account has no ledger address".into(),
            });
        }

        Ok(AnchorAccount {
            handle: wallet.username,
            address: wallet.solana_address,
            network: self.network,
            frozen: wallet.frozen,
            created_at: wallet.created_at,
        })
    }

    async fn submit_self_transfer(
        &self,
        account: &AnchorAccount,
        amount: u64,
    ) -> Result<String, SignerError> {
        let endpoint = format!("POST /wallets/{}/actions/transfer", account.handle);
        let url = self.wallet_url(&account.handle, &["actions", "transfer"])?;
        let body = TransferRequest {
            to: &account.address,
            amount: amount.to_string(),
            asset: NATIVE_ASSET,
            network: account.network.transfer_tag(),
        };

        tracing::debug!(handle = %account.handle, amount, network = %account.network, "submitting self-transfer");
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignerError::UpstreamUnavailable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SignerError::UpstreamUnavailable {
                endpoint,
                reason: format!("HTTP {}: {body}", status.as_u16()),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SignerError::SigningRejected {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp
            .text()
            .await
            .map_err(|e| SignerError::UpstreamUnavailable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        let parsed: TransferResponse =
            serde_json::from_str(&raw).map_err(|e| SignerError::NoReferenceReturned {
                endpoint: endpoint.clone(),
                detail: format!("response is not a transfer result: {e}"),
            })?;

        match parsed.tx_hash.map(|h| h.trim().to_string()) {
            Some(reference) if !reference.is_empty() => {
                tracing::info!(handle = %account.handle, %reference, "self-transfer broadcast");
                Ok(reference)
            }
            _ => Err(SignerError::NoReferenceReturned {
                endpoint,
                detail: "txHash missing or empty".into(),
            }),
        }
    }
}
