//! # Local Credential Store
//!
//! A JSON file holding `{handle, apiToken, network}` for the signing
//! service. The file is written with owner-only permissions (`0600`) on Unix.
//! Onboarding against the service happens elsewhere; this module only
//! persists and reloads the result.
//!
//! Default location: `$HOME/.agentwallet/config.json`. Files written by the
//! onboarding tool use `username` for the handle, which is accepted as an
//! alias on load.

use std::fs;
use std::path::{Path, PathBuf};

use anchor_core::Network;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

const CONFIG_DIR: &str = ".agentwallet";
const CONFIG_FILE: &str = "config.json";

/// Signing service credentials as stored on disk.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Account handle.
    #[serde(alias = "username")]
    pub handle: String,
    /// Bearer token.
    pub api_token: String,
    /// Cluster the account transacts on.
    #[serde(default)]
    #[zeroize(skip)]
    pub network: Network,
}

impl Credentials {
    /// Bundle credentials for saving.
    pub fn new(handle: impl Into<String>, api_token: impl Into<String>, network: Network) -> Self {
        Self {
            handle: handle.into(),
            api_token: api_token.into(),
            network,
        }
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.handle.trim().is_empty() {
            return Err(CredentialError::Invalid("handle is empty".into()));
        }
        if self.api_token.trim().is_empty() {
            return Err(CredentialError::Invalid("apiToken is empty".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("handle", &self.handle)
            .field("api_token", &"[REDACTED]")
            .field("network", &self.network)
            .finish()
    }
}

/// Errors reading or writing the credential file.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no home directory (HOME / USERPROFILE unset)")]
    NoHomeDirectory,
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("credential file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid credentials: {0}")]
    Invalid(String),
}

/// Reads and writes the credential file at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$HOME/.agentwallet/config.json` (or `%USERPROFILE%`).
    pub fn default_location() -> Result<Self, CredentialError> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or(CredentialError::NoHomeDirectory)?;
        Ok(Self::new(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and validate credentials.
    pub fn load(&self) -> Result<Credentials, CredentialError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_err(source))?;
        let creds: Credentials =
            serde_json::from_str(&raw).map_err(|source| CredentialError::Json {
                path: self.path.clone(),
                source,
            })?;
        creds.validate()?;
        tracing::debug!(path = %self.path.display(), handle = %creds.handle, "loaded signer credentials");
        Ok(creds)
    }

    /// Validate and write credentials with owner-only permissions, replacing
    /// any existing file.
    pub fn save(&self, creds: &Credentials) -> Result<(), CredentialError> {
        creds.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }
        let json = serde_json::to_string_pretty(creds).map_err(|source| CredentialError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_owner_only(&self.path, json.as_bytes()).map_err(|source| self.io_err(source))?;
        tracing::info!(path = %self.path.display(), "saved signer credentials (mode 0600)");
        Ok(())
    }

    fn io_err(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file too.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)
}
