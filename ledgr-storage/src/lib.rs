//! # Ledgr Storage
//!
//! Encrypted at-rest persistence for the ledgr accounting ledger.
//!
//! This crate provides:
//! - The symmetric ledger key, kept raw in its own file
//! - An authenticated AES-256-GCM envelope for the ledger file
//! - A versioned, data-only ledger snapshot
//! - Atomic ledger file writes with timeout-bounded async wrappers
//! - Passphrase-sealed identity key files
//!
//! ## Layout
//!
//! A ledger is two files: the key (32 random bytes) and the ledger itself
//! (envelope around the encoded snapshot). Identities live in a separate
//! directory, one sealed key file each. Losing the ledger key makes the
//! ledger unreadable.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod identities;
pub mod keystore;
pub mod snapshot;
pub mod store;

pub use error::StorageError;
pub use identities::IdentityStore;
pub use keystore::{generate_key_file, load_key_file, LedgerKey, LEDGER_KEY_SIZE};
pub use snapshot::{load, save, LedgerSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{LedgerStore, DEFAULT_IO_TIMEOUT};
