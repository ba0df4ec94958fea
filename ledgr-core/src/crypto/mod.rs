//! Cryptographic primitives for ledgr.
//!
//! This module provides:
//! - Ed25519 key pairs, signing, and verification of entry payloads
//! - SHA-256 hashing for block content hashes
//! - Encrypted identity key file format (Argon2id + AES-256-GCM)

mod hashing;
pub mod keyfile;
mod keys;
mod signing;

pub use hashing::{fingerprint, sha256, sha256_concat};
pub use keyfile::{decrypt_key, encrypt_key, KeyFileError};
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use signing::{sign, verify, Signature};
