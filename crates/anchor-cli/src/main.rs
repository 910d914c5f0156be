//! # route-anchor CLI entry point
//!
//! Parses command-line arguments, initializes tracing, and dispatches to
//! subcommand handlers on a tokio runtime.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anchor_cli::anchor::{run_anchor, run_batch, run_status, run_verify, BatchArgs, VerifyArgs};
use anchor_cli::context::ServiceOptions;
use anchor_cli::credentials::{run_credentials, CredentialsArgs};
use anchor_cli::decision::{run_hash, DecisionArgs};

/// Anchor route decisions on Solana through a custodial signing service.
///
/// Each anchor is a minimal self-transfer whose receipt binds a SHA-256 hash
/// of the decision to an on-chain transaction.
#[derive(Parser, Debug)]
#[command(name = "route-anchor", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    options: ServiceOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a decision's anchor record and hash without touching the network.
    Hash(DecisionArgs),

    /// Anchor one decision.
    Anchor(DecisionArgs),

    /// Anchor a JSON array of decisions in order.
    Batch(BatchArgs),

    /// Check whether a transaction reference exists on the ledger.
    Verify(VerifyArgs),

    /// Show the anchoring account's address, network, balance and frozen flag.
    Status,

    /// Manage the local credential file.
    Credentials(CredentialsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<u8> {
    let opts = cli.options;
    let audit = opts.audit();

    match cli.command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Credentials(args) => run_credentials(&args, &opts.credential_store()?),
        Commands::Anchor(args) => run_anchor(&args, &opts.service()?, audit.as_ref()).await,
        Commands::Batch(args) => run_batch(&args, &opts.service()?, audit.as_ref()).await,
        Commands::Verify(args) => run_verify(&args, &opts.service()?).await,
        Commands::Status => run_status(&opts.service()?).await,
    }
}
