//! Encrypted identity key file.
//!
//! Identity signing keys are never written to disk in plaintext. Each
//! identity's 32-byte Ed25519 seed is sealed under a passphrase-derived key.
//!
//! # File Format
//!
//! | Field      | Size (bytes) | Description                        |
//! |------------|--------------|------------------------------------|
//! | Magic      | 4            | "LGID"                             |
//! | Version    | 1            | Format version (currently 1)       |
//! | Salt       | 32           | Random salt for Argon2id           |
//! | Nonce      | 12           | Random nonce for AES-256-GCM       |
//! | Ciphertext | 48           | Encrypted seed (32) + GCM tag (16) |
//!
//! Total: 97 bytes. The magic and version bytes are bound to the ciphertext
//! as associated data.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use argon2::{Argon2, Params, Version};
use rand::RngCore;

use super::keys::KeyPair;

/// Magic bytes identifying an identity key file.
pub const KEYFILE_MAGIC: &[u8; 4] = b"LGID";

/// Current key file format version.
pub const KEYFILE_VERSION: u8 = 1;

/// Salt size in bytes (for Argon2id).
pub const SALT_SIZE: usize = 32;

/// Nonce size in bytes (for AES-GCM).
pub const NONCE_SIZE: usize = 12;

/// Private key seed size in bytes.
pub const KEY_SIZE: usize = 32;

/// GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Total key file size in bytes.
pub const KEYFILE_SIZE: usize = HEADER_SIZE + SALT_SIZE + NONCE_SIZE + KEY_SIZE + TAG_SIZE;

const HEADER_SIZE: usize = 5;

// OWASP baseline for Argon2id
const ARGON2_M_COST: u32 = 19 * 1024;
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

/// Errors that can occur during key file operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFileError {
    /// File length is not exactly [`KEYFILE_SIZE`].
    WrongSize {
        /// Expected file size in bytes.
        expected: usize,
        /// Actual file size in bytes.
        actual: usize,
    },
    /// Magic bytes don't match.
    InvalidMagic,
    /// Unsupported file format version.
    UnsupportedVersion {
        /// The version number found in the file.
        version: u8,
    },
    /// Passphrase-based key derivation failed.
    KeyDerivationFailed,
    /// Decryption failed (wrong passphrase or corrupted data).
    DecryptionFailed,
    /// Encryption failed.
    EncryptionFailed,
}

impl std::fmt::Display for KeyFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyFileError::WrongSize { expected, actual } => {
                write!(f, "identity key file has wrong size: expected {} bytes, got {}", expected, actual)
            }
            KeyFileError::InvalidMagic => write!(f, "not an identity key file"),
            KeyFileError::UnsupportedVersion { version } => {
                write!(f, "unsupported identity key file version: {}", version)
            }
            KeyFileError::KeyDerivationFailed => write!(f, "key derivation failed"),
            KeyFileError::DecryptionFailed => {
                write!(f, "decryption failed (wrong passphrase or corrupted file)")
            }
            KeyFileError::EncryptionFailed => write!(f, "encryption failed"),
        }
    }
}

impl std::error::Error for KeyFileError {}

/// Seal an identity's key pair under a passphrase.
///
/// Returns the key file bytes ([`KEYFILE_SIZE`] long). Every call draws a
/// fresh salt and nonce.
///
/// # Example
///
/// ```
/// use ledgr_core::crypto::keyfile::{encrypt_key, KEYFILE_SIZE};
/// use ledgr_core::KeyPair;
///
/// let kp = KeyPair::generate();
/// let sealed = encrypt_key(&kp, "correct horse").unwrap();
/// assert_eq!(sealed.len(), KEYFILE_SIZE);
/// ```
pub fn encrypt_key(keypair: &KeyPair, passphrase: &str) -> Result<Vec<u8>, KeyFileError> {
    let mut salt = [0u8; SALT_SIZE];
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let derived_key = derive_key(passphrase.as_bytes(), &salt)?;
    let header = header();

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|_| KeyFileError::EncryptionFailed)?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: keypair.secret_bytes(),
                aad: &header,
            },
        )
        .map_err(|_| KeyFileError::EncryptionFailed)?;

    let mut result = Vec::with_capacity(KEYFILE_SIZE);
    result.extend_from_slice(&header);
    result.extend_from_slice(&salt);
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    debug_assert_eq!(result.len(), KEYFILE_SIZE);
    Ok(result)
}

/// Open a sealed identity key file.
///
/// # Example
///
/// ```
/// use ledgr_core::crypto::keyfile::{decrypt_key, encrypt_key};
/// use ledgr_core::KeyPair;
///
/// let kp = KeyPair::generate();
/// let sealed = encrypt_key(&kp, "correct horse").unwrap();
/// let opened = decrypt_key(&sealed, "correct horse").unwrap();
/// assert_eq!(kp.public_key(), opened.public_key());
/// ```
pub fn decrypt_key(sealed: &[u8], passphrase: &str) -> Result<KeyPair, KeyFileError> {
    if sealed.len() != KEYFILE_SIZE {
        return Err(KeyFileError::WrongSize {
            expected: KEYFILE_SIZE,
            actual: sealed.len(),
        });
    }

    if &sealed[0..4] != KEYFILE_MAGIC {
        return Err(KeyFileError::InvalidMagic);
    }

    let version = sealed[4];
    if version != KEYFILE_VERSION {
        return Err(KeyFileError::UnsupportedVersion { version });
    }

    let salt = &sealed[HEADER_SIZE..HEADER_SIZE + SALT_SIZE];
    let nonce_bytes = &sealed[HEADER_SIZE + SALT_SIZE..HEADER_SIZE + SALT_SIZE + NONCE_SIZE];
    let ciphertext = &sealed[HEADER_SIZE + SALT_SIZE + NONCE_SIZE..];

    let derived_key = derive_key(passphrase.as_bytes(), salt)?;

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|_| KeyFileError::DecryptionFailed)?;
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: &sealed[..HEADER_SIZE],
            },
        )
        .map_err(|_| KeyFileError::DecryptionFailed)?;

    let seed: [u8; KEY_SIZE] = plaintext
        .as_slice()
        .try_into()
        .map_err(|_| KeyFileError::DecryptionFailed)?;

    Ok(KeyPair::from_bytes(&seed))
}

fn header() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(KEYFILE_MAGIC);
    header[4] = KEYFILE_VERSION;
    header
}

/// Derive a 256-bit encryption key from passphrase and salt using Argon2id.
fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<[u8; 32], KeyFileError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|_| KeyFileError::KeyDerivationFailed)?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|_| KeyFileError::KeyDerivationFailed)?;

    Ok(key)
}
