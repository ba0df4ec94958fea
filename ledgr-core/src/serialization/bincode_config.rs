//! Deterministic bincode configuration.
//!
//! Fixed-size integers, little-endian byte order, trailing bytes rejected.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::SerializationError;

fn config() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Serialize a value to its canonical bytes.
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    config()
        .serialize(value)
        .map_err(|e| SerializationError::EncodeFailed(e.to_string()))
}

/// Deserialize a value from canonical bytes.
///
/// Truncated input, trailing bytes and type mismatches are all errors, which
/// is what lets a partially written snapshot be told apart from a good one.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    config()
        .deserialize(bytes)
        .map_err(|e| SerializationError::DecodeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Posting {
        sequence: u64,
        class: String,
        detail: Option<String>,
    }

    fn posting() -> Posting {
        Posting {
            sequence: 7,
            class: "Assets".into(),
            detail: Some("opening balance".into()),
        }
    }

    #[test]
    fn test_roundtrip() {
        let bytes = serialize(&posting()).unwrap();
        let recovered: Posting = deserialize(&bytes).unwrap();
        assert_eq!(posting(), recovered);
    }

    #[test]
    fn test_determinism() {
        assert_eq!(serialize(&posting()).unwrap(), serialize(&posting()).unwrap());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = serialize(&posting()).unwrap();
        bytes.push(0xFF);
        assert!(deserialize::<Posting>(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated_input() {
        let bytes = serialize(&posting()).unwrap();
        for cut in [0, 1, 8, bytes.len() - 1] {
            assert!(deserialize::<Posting>(&bytes[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn test_fixed_width_little_endian_integers() {
        assert_eq!(serialize(&1u64).unwrap().len(), 8);
        assert_eq!(serialize(&0x0102_0304u32).unwrap(), vec![0x04, 0x03, 0x02, 0x01]);
    }
}
