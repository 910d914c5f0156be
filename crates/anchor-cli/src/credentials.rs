//! # Credentials Subcommand
//!
//! - `credentials init` writes the credential file (mode 0600 on Unix).
//! - `credentials show` prints it with the token masked.
//!
//! `init` takes the token from `--token`, then `AGENTWALLET_API_TOKEN`, then
//! one line of stdin.

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use anchor_core::Network;
use anchor_signer::{CredentialStore, Credentials};

/// Arguments for `route-anchor credentials`.
#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

/// Credential subcommands.
#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// Write the credential file.
    Init {
        /// Account handle on the signing service.
        #[arg(long)]
        handle: String,
        /// API token. Prefer the environment or stdin over this flag.
        #[arg(long)]
        token: Option<String>,
        /// Ledger network.
        #[arg(long, default_value = "devnet")]
        network: Network,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the stored credentials with the token masked.
    Show,
}

/// Dispatch a credentials subcommand against `store`.
pub fn run_credentials(args: &CredentialsArgs, store: &CredentialStore) -> Result<u8> {
    match &args.command {
        CredentialsCommand::Init {
            handle,
            token,
            network,
            force,
        } => {
            if store.exists() && !force {
                bail!(
                    "{} already exists (use --force to replace it)",
                    store.path().display()
                );
            }
            let token = match token {
                Some(t) => t.clone(),
                None => token_from_env_or_stdin()?,
            };
            store.save(&Credentials::new(handle.clone(), token, *network))?;
            println!("wrote {}", store.path().display());
            Ok(0)
        }
        CredentialsCommand::Show => {
            let creds = store.load()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "path": store.path().display().to_string(),
                    "handle": creds.handle,
                    "network": creds.network,
                    "apiToken": mask(&creds.api_token),
                }))?
            );
            Ok(0)
        }
    }
}

fn token_from_env_or_stdin() -> Result<String> {
    if let Ok(token) = std::env::var("AGENTWALLET_API_TOKEN") {
        return Ok(token);
    }
    eprintln!("API token:");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading API token from stdin")?;
    Ok(line.trim().to_string())
}

/// Keep the last four characters of long tokens; hide short ones entirely.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
