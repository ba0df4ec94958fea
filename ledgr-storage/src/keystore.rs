//! The symmetric ledger key.
//!
//! The key is 32 random bytes stored raw in its own file, separate from the
//! ledger. Losing it makes the ledger unrecoverable; there is no recovery
//! path.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use rand::RngCore;

use crate::error::StorageError;

/// Ledger key size in bytes (AES-256).
pub const LEDGER_KEY_SIZE: usize = 32;

/// A 256-bit ledger encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerKey([u8; LEDGER_KEY_SIZE]);

impl LedgerKey {
    /// Draw a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; LEDGER_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        LedgerKey(bytes)
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; LEDGER_KEY_SIZE]) -> Self {
        LedgerKey(bytes)
    }

    /// Parse a key from a slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StorageError> {
        let array: [u8; LEDGER_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| StorageError::InvalidKey(bytes.len()))?;
        Ok(LedgerKey(array))
    }

    /// Raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; LEDGER_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LedgerKey(..)")
    }
}

/// Generate a key and write it to `path`.
///
/// Never overwrites: fails with [`StorageError::KeyExists`] if the file is
/// already there.
pub fn generate_key_file(path: &Path) -> Result<LedgerKey, StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => StorageError::KeyExists(path.to_path_buf()),
        _ => StorageError::Io(e),
    })?;

    let key = LedgerKey::generate();
    file.write_all(key.as_bytes())?;
    file.sync_all()?;

    tracing::info!(path = %path.display(), "generated ledger key");
    Ok(key)
}

/// Read the key stored at `path`.
pub fn load_key_file(path: &Path) -> Result<LedgerKey, StorageError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::KeyNotFound(path.to_path_buf()),
        _ => StorageError::Io(e),
    })?;
    LedgerKey::from_slice(&bytes)
}
