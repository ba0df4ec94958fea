//! # Ledgr Core
//!
//! Core types, cryptography, and serialization for the ledgr accounting ledger.
//!
//! This crate provides the foundation for the other ledgr crates:
//! - Cryptographic primitives (Ed25519 signatures, SHA-256 hashing)
//! - Named signing identities and the encrypted identity key file
//! - Exact decimal amounts
//! - Signed double-entry ledger entries
//! - Hash-linked blocks
//! - Deterministic binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod block;
pub mod crypto;
pub mod entry;
pub mod error;
pub mod identity;
pub mod serialization;

// Re-export commonly used types at crate root
pub use amount::Amount;
pub use block::{Block, Provenance, GENESIS_SENTINEL};
pub use crypto::{decrypt_key, encrypt_key, KeyFileError, KeyPair, PublicKey, Signature};
pub use entry::{Entry, EntryFields};
pub use error::{CoreError, CryptoError, EntryError, SerializationError};
pub use identity::Identity;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];
