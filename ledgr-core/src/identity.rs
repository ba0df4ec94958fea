//! Named signing identities.
//!
//! An identity is a party allowed to author ledger entries. It owns one
//! Ed25519 key pair for its whole lifetime; the key is generated once and
//! every entry it signs records the public half.

use std::fmt;

use crate::crypto::{fingerprint, sign, KeyPair, PublicKey, Signature};
use crate::error::CryptoError;

/// A named party holding a signing key.
///
/// The private key is never serialized. To keep an identity across process
/// restarts, seal it with [`crate::crypto::encrypt_key`].
#[derive(Clone)]
pub struct Identity {
    name: String,
    keypair: KeyPair,
}

impl Identity {
    /// Create an identity with a freshly generated key pair.
    ///
    /// Key generation is the expensive step; create identities once and
    /// reuse them for every entry they sign.
    pub fn generate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keypair: KeyPair::generate(),
        }
    }

    /// Create an identity around an existing key pair (e.g. one opened from a key file).
    pub fn from_keypair(name: impl Into<String>, keypair: KeyPair) -> Self {
        Self {
            name: name.into(),
            keypair,
        }
    }

    /// The identity's name, unique within an authorization set.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The public verification key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Short hex label of the public key for display.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.public_key())
    }

    /// The underlying key pair, for sealing into a key file.
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Sign a payload.
    pub fn sign(&self, payload: &[u8]) -> Result<Signature, CryptoError> {
        sign(self.keypair.signing_key(), payload)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("name", &self.name)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify;

    #[test]
    fn test_sign_and_verify_with_recorded_key() {
        let alice = Identity::generate("alice");
        let recorded_key = alice.public_key();

        let signature = alice.sign(b"payload").unwrap();
        drop(alice);

        assert!(verify(&recorded_key, b"payload", &signature).is_ok());
    }

    #[test]
    fn test_public_key_is_stable() {
        let alice = Identity::generate("alice");
        assert_eq!(alice.public_key(), alice.public_key());
        assert_eq!(alice.clone().public_key(), alice.public_key());
    }

    #[test]
    fn test_from_keypair_keeps_key() {
        let kp = KeyPair::generate();
        let expected = kp.public_key();
        let bob = Identity::from_keypair("bob", kp);
        assert_eq!(bob.name(), "bob");
        assert_eq!(bob.public_key(), expected);
    }

    #[test]
    fn test_debug_omits_secret() {
        let alice = Identity::generate("alice");
        let debug = format!("{:?}", alice);
        assert!(debug.contains("alice"));
        assert!(!debug.contains(&hex::encode(alice.keypair().secret_bytes())));
    }
}
