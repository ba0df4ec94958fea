//! Encrypted ledger envelope.
//!
//! # File Format
//!
//! | Field      | Size (bytes) | Description                      |
//! |------------|--------------|----------------------------------|
//! | Magic      | 4            | "LDGR"                           |
//! | Version    | 1            | Envelope version (currently 1)   |
//! | Nonce      | 12           | Random nonce for AES-256-GCM     |
//! | Ciphertext | variable     | Encrypted snapshot + GCM tag (16)|
//!
//! Magic and version are authenticated as associated data, so editing any
//! byte of the file makes decryption fail.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;

use crate::error::StorageError;
use crate::keystore::LedgerKey;

/// Magic bytes identifying a ledger file.
pub const ENVELOPE_MAGIC: &[u8; 4] = b"LDGR";

/// Current envelope version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Nonce size in bytes (for AES-GCM).
pub const NONCE_SIZE: usize = 12;

const HEADER_SIZE: usize = 5;
const TAG_SIZE: usize = 16;

/// Encrypt `plaintext` under `key` with a fresh nonce.
pub fn seal(plaintext: &[u8], key: &LedgerKey) -> Result<Vec<u8>, StorageError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(ENVELOPE_MAGIC);
    header[4] = ENVELOPE_VERSION;

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| StorageError::Encryption)?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|_| StorageError::Encryption)?;

    let mut out = Vec::with_capacity(HEADER_SIZE + NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Check the header and decrypt an envelope.
pub fn open(envelope: &[u8], key: &LedgerKey) -> Result<Vec<u8>, StorageError> {
    if envelope.len() < HEADER_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(StorageError::Deserialization(format!(
            "ledger file too short: {} bytes",
            envelope.len()
        )));
    }
    if &envelope[..4] != ENVELOPE_MAGIC {
        return Err(StorageError::Deserialization("not a ledger file".into()));
    }
    let version = envelope[4];
    if version != ENVELOPE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            what: "envelope",
            version: version.into(),
        });
    }

    let (header, rest) = envelope.split_at(HEADER_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| StorageError::Decryption)?;
    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| StorageError::Decryption)
}
