//! # Service Wiring
//!
//! Resolves signer credentials and ledger settings from flags, the
//! credential file and the environment, then assembles an
//! [`AnchorService`]. Resolution order for the signer:
//!
//! 1. `--credentials <PATH>` (must exist)
//! 2. `$HOME/.agentwallet/config.json` if present
//! 3. `AGENTWALLET_*` environment variables

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use anchor_core::Finality;
use anchor_ledger::{ConfirmationPolicy, RpcConfig, RpcLedger};
use anchor_service::{AnchorConfig, AnchorService};
use anchor_signer::{CredentialStore, HttpSigner, SignerConfig};

use crate::audit::AuditLog;

/// Flags shared by every subcommand that talks to the network.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceOptions {
    /// Demo mode: produce "disabled" receipts without any network call.
    #[arg(long, global = true)]
    pub disabled: bool,

    /// Credential file (default: ~/.agentwallet/config.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Ledger JSON-RPC endpoint (default: ANCHOR_RPC_URL or the network's public endpoint).
    #[arg(long, global = true, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Finality required before an anchor counts as confirmed.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub finality: Option<Finality>,

    /// Minimum pause between batch attempts, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub min_interval_ms: Option<u64>,

    /// Append every receipt to this file as one JSON line.
    #[arg(long, global = true, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,
}

impl ServiceOptions {
    /// The audit sink, if one was requested.
    pub fn audit(&self) -> Option<AuditLog> {
        self.audit_log.clone().map(AuditLog::new)
    }

    /// Credential store named by `--credentials`, or the default location.
    pub fn credential_store(&self) -> Result<CredentialStore> {
        match &self.credentials {
            Some(path) => Ok(CredentialStore::new(path)),
            None => CredentialStore::default_location()
                .context("cannot determine default credential location"),
        }
    }

    /// Resolve the signer configuration.
    pub fn signer_config(&self) -> Result<SignerConfig> {
        let store = self.credential_store()?;
        if store.exists() {
            let creds = store.load()?;
            return SignerConfig::from_credentials(&creds)
                .with_context(|| format!("invalid credentials in {}", store.path().display()));
        }
        if self.credentials.is_some() {
            bail!("credential file not found: {}", store.path().display());
        }
        SignerConfig::from_env().with_context(|| {
            format!(
                "no credential file at {} and AGENTWALLET_USERNAME / AGENTWALLET_API_TOKEN are not set \
                 (run `route-anchor credentials init`)",
                store.path().display()
            )
        })
    }

    /// Assemble a service for `signer`.
    pub fn build_service(&self, signer: SignerConfig) -> Result<AnchorService> {
        let network = signer.network;

        let mut rpc = RpcConfig::from_env(network)?;
        if let Some(raw) = &self.rpc_url {
            rpc.endpoint = raw
                .parse::<url::Url>()
                .with_context(|| format!("invalid --rpc-url {raw}"))?;
        }

        let mut config = AnchorConfig {
            enabled: !self.disabled,
            confirmation: ConfirmationPolicy::from_env(),
            ..AnchorConfig::default()
        };
        if let Some(finality) = self.finality {
            config.finality = finality;
        }
        if let Some(ms) = self.min_interval_ms {
            config.min_interval = Duration::from_millis(ms);
        }

        tracing::debug!(
            handle = %signer.handle,
            %network,
            rpc = %rpc.endpoint,
            enabled = config.enabled,
            "building anchor service"
        );

        let signer = HttpSigner::new(signer)?;
        let ledger = RpcLedger::new(rpc)?;
        Ok(AnchorService::new(Arc::new(signer), Arc::new(ledger), config))
    }

    /// Resolve credentials and assemble a service.
    pub fn service(&self) -> Result<AnchorService> {
        let signer = self.signer_config()?;
        self.build_service(signer)
    }
}
