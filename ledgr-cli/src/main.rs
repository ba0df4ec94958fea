//! ledgr - command-line front end for the accounting ledger.
//!
//! # Usage
//!
//! ```bash
//! # Create the ledger key and genesis block
//! ledgr init --identity owner
//!
//! # Add another signer
//! ledgr identity new clerk
//!
//! # Append a balanced JSON batch
//! ledgr post --creator owner --batch march.json
//!
//! # Bring in an external export as an imported block
//! ledgr import --creator clerk --file bank-export.json --label "bank march"
//!
//! # Re-hash the chain and re-check signatures
//! ledgr verify
//!
//! # List blocks created in March
//! ledgr show --from 2024-03-01 --to 2024-03-31
//! ```
//!
//! Set `LEDGR_PASSPHRASE` to skip the passphrase prompt.

mod cli;
mod commands;
mod config;

use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Passphrase;
use crate::config::LedgerConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("ledgr v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = LedgerConfig::from_cli(&cli);
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");

    commands::run(&config, cli.command, &Passphrase::from_env()).await
}
