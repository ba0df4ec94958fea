//! Identity key files.
//!
//! Each identity lives in `<dir>/<name>.key`, sealed under a passphrase with
//! the core key file format. Seeds are never written in plaintext.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ledgr_chain::AuthorizationSet;
use ledgr_core::{decrypt_key, encrypt_key, Identity};

use crate::error::StorageError;

const KEY_EXTENSION: &str = "key";

/// Directory of encrypted identity key files.
#[derive(Clone, Debug)]
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a key file exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Generate a new identity and seal it under `passphrase`.
    pub fn create(&self, name: &str, passphrase: &str) -> Result<Identity, StorageError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let identity = Identity::generate(name);
        let sealed = encrypt_key(identity.keypair(), passphrase)?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::IdentityExists(name.to_string()),
            _ => StorageError::Io(e),
        })?;
        file.write_all(&sealed)?;
        file.sync_all()?;

        tracing::info!(name, fingerprint = %identity.fingerprint(), "created identity");
        Ok(identity)
    }

    /// Open the identity stored under `name`.
    pub fn load(&self, name: &str, passphrase: &str) -> Result<Identity, StorageError> {
        let path = self.path_for(name)?;
        let sealed = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::IdentityNotFound(name.to_string()),
            _ => StorageError::Io(e),
        })?;
        let keypair = decrypt_key(&sealed, passphrase)?;
        Ok(Identity::from_keypair(name, keypair))
    }

    /// Names of stored identities, sorted. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_name(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Open the named identities into an authorization set.
    pub fn load_authorization<I, S>(
        &self,
        names: I,
        passphrase: &str,
    ) -> Result<AuthorizationSet, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = AuthorizationSet::new();
        for name in names {
            set.insert(self.load(name.as_ref(), passphrase)?)?;
        }
        tracing::debug!(identities = set.len(), "loaded authorization set");
        Ok(set)
    }

    /// Open every stored identity.
    pub fn load_all(&self, passphrase: &str) -> Result<AuthorizationSet, StorageError> {
        self.load_authorization(self.list()?, passphrase)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_name(name) {
            return Err(StorageError::InvalidIdentityName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{KEY_EXTENSION}")))
    }
}

/// Names map to file names: ASCII letters, digits, `-`, `_` and `.`, not
/// starting with a dot.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
