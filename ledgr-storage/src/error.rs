//! Storage error types.

use std::path::PathBuf;
use std::time::Duration;

use ledgr_chain::LedgerError;
use ledgr_core::{KeyFileError, SerializationError};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The ledger key file does not exist.
    #[error("Key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    /// The ledger key has the wrong length.
    #[error("Invalid key: expected 32 bytes, got {0}")]
    InvalidKey(usize),

    /// A key file already exists and will not be overwritten.
    #[error("Key file already exists: {}", .0.display())]
    KeyExists(PathBuf),

    /// Wrong key, or the ciphertext or its header was altered.
    #[error("Decryption failed (wrong key or tampered ledger file)")]
    Decryption,

    /// Encryption failed.
    #[error("Encryption failed")]
    Encryption,

    /// Encoding a snapshot failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Decrypted content is not a well-formed ledger.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The file was written by an unknown format version.
    #[error("Unsupported {what} version: {version}")]
    UnsupportedVersion {
        /// Which layer carries the version (envelope or snapshot).
        what: &'static str,
        /// The version found.
        version: u16,
    },

    /// File I/O did not finish in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A background I/O task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),

    /// No key file for the named identity.
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    /// An identity with this name is already stored.
    #[error("Identity already exists: {0}")]
    IdentityExists(String),

    /// Identity names become file names and are restricted accordingly.
    #[error("Invalid identity name: {0:?}")]
    InvalidIdentityName(String),

    /// An identity key file could not be sealed or opened.
    #[error("Identity key file error: {0}")]
    Keyfile(#[from] KeyFileError),

    /// Building an authorization set failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SerializationError> for StorageError {
    fn from(e: SerializationError) -> Self {
        match e {
            SerializationError::EncodeFailed(msg) => StorageError::Serialization(msg),
            SerializationError::DecodeFailed(msg) => StorageError::Deserialization(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_mapping() {
        let err: StorageError = SerializationError::DecodeFailed("eof".into()).into();
        assert!(matches!(err, StorageError::Deserialization(_)));

        let err: StorageError = SerializationError::EncodeFailed("size".into()).into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::UnsupportedVersion {
            what: "snapshot",
            version: 7,
        };
        assert_eq!(err.to_string(), "Unsupported snapshot version: 7");
        assert_eq!(
            StorageError::InvalidKey(16).to_string(),
            "Invalid key: expected 32 bytes, got 16"
        );
    }
}
