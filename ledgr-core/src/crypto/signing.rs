//! Ed25519 signature creation and verification.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::keys::{PublicKey, SecretKey};
use crate::error::CryptoError;

/// Ed25519 signature wrapper with custom serialization.
///
/// Serializes as the raw 64 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub ed25519_dalek::Signature);

impl Signature {
    /// Create a Signature from raw bytes.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Signature(ed25519_dalek::Signature::from_bytes(bytes))
    }

    /// Get the raw bytes of the signature.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Lowercase hex rendering, as shown to report readers.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignatureVisitor;

        impl<'de> serde::de::Visitor<'de> for SignatureVisitor {
            type Value = Signature;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("64 bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Signature, E> {
                let bytes: [u8; 64] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(Signature::from_bytes(&bytes))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Signature, A::Error> {
                let mut bytes = [0u8; 64];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Signature::from_bytes(&bytes))
            }
        }

        deserializer.deserialize_bytes(SignatureVisitor)
    }
}

/// Sign a message with a secret key.
///
/// Ed25519 signing is deterministic: the same key and message always yield
/// the same signature.
pub fn sign(secret_key: &SecretKey, message: &[u8]) -> Result<Signature, CryptoError> {
    secret_key
        .try_sign(message)
        .map(Signature)
        .map_err(|_| CryptoError::SigningFailed)
}

/// Verify a signature against a message and public key.
///
/// Needs only the public key, so historical entries can be checked long
/// after the signer's private key is gone.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
    public_key
        .inner()
        .verify(message, &signature.0)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_sign_verify_roundtrip() {
        let kp = KeyPair::generate();
        let message = b"Assets/Cash 100.00";

        let signature = sign(kp.signing_key(), message).unwrap();
        assert!(verify(&kp.public_key(), message, &signature).is_ok());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = KeyPair::generate();

        let signature = sign(kp.signing_key(), b"debit 100").unwrap();
        let result = verify(&kp.public_key(), b"debit 1000", &signature);

        assert!(matches!(result, Err(CryptoError::SignatureVerificationFailed)));
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();

        let signature = sign(kp1.signing_key(), b"entry").unwrap();
        assert!(verify(&kp2.public_key(), b"entry", &signature).is_err());
    }

    #[test]
    fn test_signature_determinism() {
        let kp = KeyPair::generate();

        let sig1 = sign(kp.signing_key(), b"entry").unwrap();
        let sig2 = sign(kp.signing_key(), b"entry").unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_serialization() {
        let kp = KeyPair::generate();
        let signature = sign(kp.signing_key(), b"entry").unwrap();

        let bytes = crate::serialization::serialize(&signature).unwrap();
        let recovered: Signature = crate::serialization::deserialize(&bytes).unwrap();

        assert_eq!(signature, recovered);
        assert!(verify(&kp.public_key(), b"entry", &recovered).is_ok());
    }

    #[test]
    fn test_signature_hex() {
        let kp = KeyPair::generate();
        let signature = sign(kp.signing_key(), b"entry").unwrap();
        assert_eq!(signature.to_hex().len(), 128);
    }
}
