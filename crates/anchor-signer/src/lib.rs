//! # anchor-signer -- Custodial Signing Service Adapter
//!
//! The signing service holds the account's keys and exposes an HTTP action
//! API. This crate is the only path through which the workspace talks to it:
//!
//! - [`RemoteSigner`]: the capability set the anchor service depends on.
//! - [`HttpSigner`]: the production implementation over `reqwest`.
//! - [`CredentialStore`]: owner-only JSON file holding handle, token and
//!   network, loaded before constructing a signer.
//!
//! ## Side Effects
//!
//! A successful [`RemoteSigner::submit_self_transfer`] creates an
//! irreversible on-chain transaction. Nothing in this crate retries it.

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;

pub use config::{ConfigError, SignerConfig};
pub use credentials::{CredentialError, CredentialStore, Credentials};
pub use error::SignerError;
pub use http::HttpSigner;

use anchor_core::AnchorAccount;
use async_trait::async_trait;

/// Operations the anchor service needs from a custodial signer.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe so production and
/// test signers can be swapped at runtime.
#[async_trait]
pub trait RemoteSigner: Send + Sync {
    /// Handle of the account this signer is authorised for.
    fn handle(&self) -> &str;

    /// Resolve identity and status for `handle`.
    ///
    /// Fails with [`SignerError::AccountNotFound`] when the service has no
    /// such account and [`SignerError::UpstreamUnavailable`] on transport or
    /// server failure.
    async fn fetch_account(&self, handle: &str) -> Result<AnchorAccount, SignerError>;

    /// Sign and broadcast a transfer of `amount` base units from the
    /// account's address to itself. Returns the transaction reference.
    async fn submit_self_transfer(
        &self,
        account: &AnchorAccount,
        amount: u64,
    ) -> Result<String, SignerError>;
}
