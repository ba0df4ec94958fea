//! Command-line argument parsing.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// Tamper-evident double-entry ledger.
#[derive(Parser, Debug, Clone)]
#[command(name = "ledgr")]
#[command(about = "Tamper-evident double-entry accounting ledger")]
#[command(version)]
pub struct Cli {
    /// Directory holding the ledger, its key and the identities.
    #[arg(long, global = true, default_value = "~/.ledgr")]
    pub data_dir: PathBuf,

    /// Encrypted ledger file (default: <data-dir>/ledger.dat).
    #[arg(long, global = true)]
    pub ledger_file: Option<PathBuf>,

    /// Raw ledger key file (default: <data-dir>/ledger.key).
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Identity key file directory (default: <data-dir>/identities).
    #[arg(long, global = true)]
    pub identity_dir: Option<PathBuf>,

    /// Upper bound on a ledger save or load, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    pub io_timeout_secs: u64,

    /// Reject entries whose subclass is not already registered.
    #[arg(long, global = true)]
    pub strict_subclasses: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger key and a new ledger whose genesis is signed by
    /// the named identity. The identity is created if it does not exist.
    Init {
        /// Identity that signs the genesis block.
        #[arg(long, required = true)]
        identity: String,
    },

    /// Manage signing identities.
    #[command(subcommand)]
    Identity(IdentityCommand),

    /// Append a JSON batch of entries as one block.
    Post {
        /// Identity appending the block.
        #[arg(long, required = true)]
        creator: String,

        /// Path to the JSON batch.
        #[arg(long, required = true)]
        batch: PathBuf,
    },

    /// Append an external JSON batch as one imported block.
    Import {
        /// Identity appending the block.
        #[arg(long, required = true)]
        creator: String,

        /// Path to the JSON batch.
        #[arg(long, required = true)]
        file: PathBuf,

        /// Source label (default: the batch's own label, then the file name).
        #[arg(long)]
        label: Option<String>,
    },

    /// Re-hash the whole chain and re-check every entry signature.
    Verify,

    /// Print blocks created within a time range.
    Show {
        /// Start of the range, RFC 3339 or YYYY-MM-DD (inclusive).
        #[arg(long, value_parser = parse_range_start)]
        from: Option<DateTime<Utc>>,

        /// End of the range, RFC 3339 or YYYY-MM-DD (inclusive, whole day).
        #[arg(long, value_parser = parse_range_end)]
        to: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum IdentityCommand {
    /// Generate a new identity sealed under a passphrase.
    New {
        /// Identity name.
        name: String,
    },

    /// List stored identities.
    List,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Expand the data directory path (handle ~ for home).
    pub fn expanded_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Replace a leading `~/` with the home directory.
pub fn expand_home(path: &std::path::Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

fn parse_range_start(s: &str) -> Result<DateTime<Utc>, String> {
    parse_time(s, false)
}

fn parse_range_end(s: &str) -> Result<DateTime<Utc>, String> {
    parse_time(s, true)
}

/// A bare date covers the whole day: midnight when it opens a range, the
/// last microsecond when it closes one.
fn parse_time(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(time) = s.parse::<DateTime<Utc>>() {
        return Ok(time);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("expected RFC 3339 time or YYYY-MM-DD, got '{}'", s))?;
    let time = if end_of_day {
        date.and_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", s))
}
