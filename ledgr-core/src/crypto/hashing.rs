//! SHA-256 hashing utilities.

use sha2::{Digest, Sha256};

use super::keys::PublicKey;

/// Compute SHA-256 hash of the input data.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 hash of concatenated data slices.
///
/// Feeds each part to the hasher in order, so no concatenation buffer is
/// allocated. Block content hashes are built this way.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Short display label for a public key: hex of the first 8 bytes of its SHA-256.
///
/// Only for humans reading logs and listings; never used for authorization.
pub fn fingerprint(public_key: &PublicKey) -> String {
    let hash = sha256(public_key.as_bytes());
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_sha256_determinism() {
        let data = b"ledger block";
        assert_eq!(sha256(data), sha256(data));
    }

    #[test]
    fn test_sha256_known_value() {
        // SHA-256("abc") from FIPS 180-2
        let hash = sha256(b"abc");
        assert_eq!(
            hex::encode(hash),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_concat_equals_manual() {
        let concat_hash = sha256_concat(&[b"debit", b"credit"]);
        let manual_hash = sha256(b"debitcredit");
        assert_eq!(concat_hash, manual_hash);
    }

    #[test]
    fn test_sha256_concat_empty_parts() {
        assert_eq!(sha256_concat(&[]), sha256(b""));
        assert_eq!(sha256_concat(&[b"", b"x", b""]), sha256(b"x"));
    }

    #[test]
    fn test_fingerprint() {
        let kp = KeyPair::generate();
        let fp = fingerprint(&kp.public_key());
        assert_eq!(fp.len(), 16);
        assert_eq!(fp, fingerprint(&kp.public_key()));

        let other = KeyPair::generate();
        assert_ne!(fp, fingerprint(&other.public_key()));
    }
}
