//! # Solana JSON-RPC Ledger Client
//!
//! | Method | Use |
//! |--------|-----|
//! | `getSignatureStatuses` | Confirmation polling (`searchTransactionHistory: true`) |
//! | `getTransaction` | Existence lookup at `confirmed` commitment |
//! | `getBalance` | Account balance in lamports |
//!
//! ## Confirmation Polling
//!
//! [`RpcLedger::await_confirmation`](crate::LedgerClient::await_confirmation)
//! polls until the reported status reaches the requested finality or the
//! [`ConfirmationPolicy`](crate::ConfirmationPolicy) bound elapses. The bound
//! covers the whole wait, so a poll still in flight at the deadline is
//! abandoned rather than awaited. Transport
//! errors during polling do not end the wait: the transaction was already
//! submitted, so the only honest outcomes are "confirmed", "failed on-chain"
//! or "not observed in time".

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anchor_core::Finality;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::config::{ConfirmationPolicy, RpcConfig};
use crate::error::LedgerError;
use crate::LedgerClient;

// -- Wire types ---------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// One entry of `getSignatureStatuses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    #[serde(default)]
    confirmations: Option<u64>,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    confirmation_status: Option<Finality>,
}

impl SignatureStatus {
    /// Finality reached. A missing status with `confirmations: null` means rooted.
    fn finality(&self) -> Finality {
        match self.confirmation_status {
            Some(level) => level,
            None if self.confirmations.is_none() => Finality::Finalized,
            None => Finality::Processed,
        }
    }
}

// -- Client -------------------------------------------------------------------

/// [`LedgerClient`] over Solana JSON-RPC.
#[derive(Debug)]
pub struct RpcLedger {
    http: reqwest::Client,
    endpoint: url::Url,
    next_id: AtomicU64,
}

impl RpcLedger {
    /// Create a new client from configuration.
    pub fn new(config: RpcConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Transport {
                method: "client_init".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint: config.endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Transport {
                method: method.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let envelope: RpcResponse<T> = resp.json().await.map_err(|e| LedgerError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(err) = envelope.error {
            return Err(LedgerError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        Ok(envelope.result)
    }

    async fn signature_status(&self, reference: &str) -> Result<Option<SignatureStatus>, LedgerError> {
        let statuses: Option<WithContext<Vec<Option<SignatureStatus>>>> = self
            .call(
                "getSignatureStatuses",
                json!([[reference], {"searchTransactionHistory": true}]),
            )
            .await?;
        Ok(statuses
            .and_then(|s| s.value.into_iter().next())
            .flatten())
    }

    /// Poll until `reference` reaches `finality` or fails on-chain. Unbounded;
    /// the caller owns the deadline.
    async fn poll_status(
        &self,
        reference: &str,
        finality: Finality,
        poll_interval: Duration,
    ) -> Result<(), LedgerError> {
        let mut polls: u32 = 0;
        loop {
            polls += 1;
            match self.signature_status(reference).await {
                Ok(Some(status)) => {
                    if let Some(err) = status.err {
                        return Err(LedgerError::TransactionFailed {
                            reference: reference.to_string(),
                            reason: err.to_string(),
                        });
                    }
                    let reached = status.finality();
                    if reached >= finality {
                        tracing::debug!(%reference, %reached, polls, "transaction confirmed");
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(%reference, polls, error = %e, "confirmation poll failed; still waiting");
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn await_confirmation(
        &self,
        reference: &str,
        finality: Finality,
        policy: &ConfirmationPolicy,
    ) -> Result<(), LedgerError> {
        let started = Instant::now();
        let polling = self.poll_status(reference, finality, policy.poll_interval);
        match tokio::time::timeout(policy.timeout, polling).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                reference: reference.to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }

    async fn lookup(&self, reference: &str) -> Result<bool, LedgerError> {
        let tx: Option<Value> = self
            .call(
                "getTransaction",
                json!([
                    reference,
                    {
                        "commitment": Finality::Confirmed.as_str(),
                        "encoding": "json",
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;
        Ok(tx.is_some_and(|v| !v.is_null()))
    }

    async fn balance(&self, address: &str) -> Result<u64, LedgerError> {
        let balance: Option<WithContext<u64>> = self
            .call(
                "getBalance",
                json!([address, {"commitment": Finality::Confirmed.as_str()}]),
            )
            .await?;
        balance.map(|b| b.value).ok_or_else(|| LedgerError::Decode {
            method: "getBalance".into(),
            reason: "result missing".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_finality_from_confirmation_status() {
        let s: SignatureStatus = serde_json::from_value(json!({
            "slot": 1, "confirmations": 3, "err": null, "confirmationStatus": "confirmed"
        }))
        .unwrap();
        assert_eq!(s.finality(), Finality::Confirmed);
    }

    #[test]
    fn null_confirmations_without_status_is_finalized() {
        let s: SignatureStatus =
            serde_json::from_value(json!({"slot": 1, "confirmations": null, "err": null})).unwrap();
        assert_eq!(s.finality(), Finality::Finalized);
    }

    #[test]
    fn counted_confirmations_without_status_is_processed() {
        let s: SignatureStatus =
            serde_json::from_value(json!({"slot": 1, "confirmations": 0, "err": null})).unwrap();
        assert_eq!(s.finality(), Finality::Processed);
    }

    #[test]
    fn request_envelope_shape() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "getBalance",
            params: json!(["addr"]),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "getBalance", "params": ["addr"]})
        );
    }
}
