//! Ledger configuration.

use std::path::PathBuf;
use std::time::Duration;

use ledgr_chain::SubclassPolicy;
use ledgr_storage::{IdentityStore, LedgerStore, DEFAULT_IO_TIMEOUT};

use crate::cli::{expand_home, Cli};

const LEDGER_FILE: &str = "ledger.dat";
const KEY_FILE: &str = "ledger.key";
const IDENTITY_DIR: &str = "identities";

/// Complete ledger configuration.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct LedgerConfig {
    /// Data directory.
    pub data_dir: PathBuf,

    /// Encrypted ledger file.
    pub ledger_path: PathBuf,

    /// Raw ledger key file.
    pub key_path: PathBuf,

    /// Identity key files.
    pub identity_dir: PathBuf,

    /// Bound on a single ledger save or load.
    pub io_timeout: Duration,

    /// What to do with unregistered subclasses.
    pub subclass_policy: SubclassPolicy,

    /// Log level.
    pub log_level: String,
}

impl LedgerConfig {
    /// Create a configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let data_dir = cli.expanded_data_dir();
        let pick = |flag: &Option<PathBuf>, default: &str| match flag {
            Some(path) => expand_home(path),
            None => data_dir.join(default),
        };

        Self {
            ledger_path: pick(&cli.ledger_file, LEDGER_FILE),
            key_path: pick(&cli.key_file, KEY_FILE),
            identity_dir: pick(&cli.identity_dir, IDENTITY_DIR),
            io_timeout: Duration::from_secs(cli.io_timeout_secs),
            subclass_policy: if cli.strict_subclasses {
                SubclassPolicy::Strict
            } else {
                SubclassPolicy::AutoRegister
            },
            log_level: cli.log_level.clone(),
            data_dir,
        }
    }

    /// Configuration rooted at `data_dir` with every other setting default.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            ledger_path: data_dir.join(LEDGER_FILE),
            key_path: data_dir.join(KEY_FILE),
            identity_dir: data_dir.join(IDENTITY_DIR),
            io_timeout: DEFAULT_IO_TIMEOUT,
            subclass_policy: SubclassPolicy::default(),
            log_level: "warn".to_string(),
            data_dir,
        }
    }

    /// Ledger and key files.
    pub fn ledger_store(&self) -> LedgerStore {
        LedgerStore::new(&self.ledger_path, &self.key_path).with_timeout(self.io_timeout)
    }

    /// Identity key files.
    pub fn identity_store(&self) -> IdentityStore {
        IdentityStore::new(&self.identity_dir)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::in_dir(expand_home(&PathBuf::from("~/.ledgr")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::in_dir("/books");
        assert_eq!(config.ledger_path, PathBuf::from("/books/ledger.dat"));
        assert_eq!(config.key_path, PathBuf::from("/books/ledger.key"));
        assert_eq!(config.identity_dir, PathBuf::from("/books/identities"));
        assert_eq!(config.io_timeout, DEFAULT_IO_TIMEOUT);
        assert_eq!(config.subclass_policy, SubclassPolicy::AutoRegister);
    }

    #[test]
    fn test_from_cli_overrides() {
        let cli = Cli::parse_from([
            "ledgr",
            "verify",
            "--data-dir",
            "/books",
            "--key-file",
            "/secure/ledger.key",
            "--io-timeout-secs",
            "5",
            "--strict-subclasses",
        ]);
        let config = LedgerConfig::from_cli(&cli);

        assert_eq!(config.data_dir, PathBuf::from("/books"));
        assert_eq!(config.ledger_path, PathBuf::from("/books/ledger.dat"));
        assert_eq!(config.key_path, PathBuf::from("/secure/ledger.key"));
        assert_eq!(config.io_timeout, Duration::from_secs(5));
        assert_eq!(config.subclass_policy, SubclassPolicy::Strict);
    }

    #[test]
    fn test_stores_use_config_paths() {
        let config = LedgerConfig::in_dir("/books");
        let store = config.ledger_store();
        assert_eq!(store.ledger_path(), config.ledger_path.as_path());
        assert_eq!(store.key_path(), config.key_path.as_path());
        assert_eq!(config.identity_store().dir(), config.identity_dir.as_path());
    }
}
