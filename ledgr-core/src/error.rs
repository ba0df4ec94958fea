//! Error types for the ledgr core crate.

use std::fmt;

/// Top-level error type for ledgr-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Cryptographic operation failed.
    Crypto(CryptoError),
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
    /// An entry could not be constructed.
    Entry(EntryError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Crypto(e) => write!(f, "crypto error: {}", e),
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            CoreError::Entry(e) => write!(f, "entry error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<CryptoError> for CoreError {
    fn from(e: CryptoError) -> Self {
        CoreError::Crypto(e)
    }
}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

impl From<EntryError> for CoreError {
    fn from(e: EntryError) -> Self {
        CoreError::Entry(e)
    }
}

/// Errors related to cryptographic operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CryptoError {
    /// The public key is malformed or invalid.
    InvalidPublicKey,
    /// Signing failed; only happens when key material is corrupted.
    SigningFailed,
    /// Signature verification failed (signature doesn't match message/key).
    SignatureVerificationFailed,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidPublicKey => write!(f, "invalid public key format"),
            CryptoError::SigningFailed => write!(f, "signing failed"),
            CryptoError::SignatureVerificationFailed => write!(f, "signature verification failed"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}

/// Errors raised while constructing an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryError {
    /// Debit or credit was below zero.
    NegativeAmount {
        /// Which side was negative ("debit" or "credit").
        side: &'static str,
        /// The rejected amount in canonical form.
        amount: String,
    },
    /// The accounting class or subclass was empty.
    EmptyClassification,
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryError::NegativeAmount { side, amount } => {
                write!(f, "{} amount must not be negative, got {}", side, amount)
            }
            EntryError::EmptyClassification => {
                write!(f, "accounting class and subclass must not be empty")
            }
        }
    }
}

impl std::error::Error for EntryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = CoreError::Crypto(CryptoError::SigningFailed);
        assert!(e.to_string().contains("signing failed"));

        let e = CoreError::Serialization(SerializationError::EncodeFailed("test".into()));
        assert!(e.to_string().contains("encode failed"));

        let e = CoreError::Entry(EntryError::NegativeAmount {
            side: "debit",
            amount: "-5".into(),
        });
        assert!(e.to_string().contains("debit amount must not be negative"));
    }

    #[test]
    fn test_error_conversion() {
        let entry_err = EntryError::EmptyClassification;
        let core_err: CoreError = entry_err.into();
        assert!(matches!(core_err, CoreError::Entry(EntryError::EmptyClassification)));
    }
}
