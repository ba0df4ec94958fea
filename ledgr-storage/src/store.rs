//! Ledger and key files on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ledgr_chain::{AuthorizationSet, Chain};

use crate::error::StorageError;
use crate::keystore::{generate_key_file, load_key_file, LedgerKey};
use crate::snapshot::{load, seal_snapshot, LedgerSnapshot};

/// Default bound on a single save or load.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// A ledger file and the key file that unlocks it.
#[derive(Clone, Debug)]
pub struct LedgerStore {
    ledger_path: PathBuf,
    key_path: PathBuf,
    io_timeout: Duration,
}

impl LedgerStore {
    /// Create a store over the given paths. Nothing is touched on disk.
    pub fn new(ledger_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            key_path: key_path.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Set the timeout used by the async operations.
    pub fn with_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// Path of the encrypted ledger file.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Path of the raw key file.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Whether a ledger file is present.
    pub fn exists(&self) -> bool {
        self.ledger_path.is_file()
    }

    /// Generate the key file. Fails if one already exists.
    pub fn init_key(&self) -> Result<LedgerKey, StorageError> {
        generate_key_file(&self.key_path)
    }

    /// Read the key file.
    pub fn key(&self) -> Result<LedgerKey, StorageError> {
        load_key_file(&self.key_path)
    }

    /// Encrypt and write the chain.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a crash mid-write leaves the previous ledger intact.
    pub fn save(&self, chain: &Chain) -> Result<(), StorageError> {
        self.write_snapshot(&LedgerSnapshot::capture(chain))
    }

    /// Read and decrypt the chain.
    pub fn load(&self, authorization: AuthorizationSet) -> Result<Chain, StorageError> {
        let key = self.key()?;
        let bytes = fs::read(&self.ledger_path)?;
        let chain = load(&bytes, &key, authorization)?;
        tracing::info!(
            path = %self.ledger_path.display(),
            blocks = chain.len(),
            "loaded ledger"
        );
        Ok(chain)
    }

    /// [`save`](Self::save) on the blocking pool, bounded by the store's
    /// timeout.
    ///
    /// The chain is copied before the call returns control, so the caller may
    /// keep appending while the write proceeds. A write that outlives the
    /// timeout is not cancelled: it may still replace the ledger file after
    /// [`StorageError::Timeout`] is returned, always with a complete snapshot.
    pub async fn save_async(&self, chain: &Chain) -> Result<(), StorageError> {
        let snapshot = LedgerSnapshot::capture(chain);
        let store = self.clone();
        self.run_blocking(move || store.write_snapshot(&snapshot)).await
    }

    /// [`load`](Self::load) on the blocking pool, bounded by the store's
    /// timeout.
    pub async fn load_async(&self, authorization: AuthorizationSet) -> Result<Chain, StorageError> {
        let store = self.clone();
        self.run_blocking(move || store.load(authorization)).await
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce() -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(f);
        match tokio::time::timeout(self.io_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StorageError::Task(join_err.to_string())),
            Err(_) => {
                tracing::warn!(timeout = ?self.io_timeout, "ledger I/O timed out");
                Err(StorageError::Timeout(self.io_timeout))
            }
        }
    }

    fn write_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        let key = self.key()?;
        let bytes = seal_snapshot(snapshot, &key)?;
        self.write_atomic(&bytes)?;
        tracing::info!(
            path = %self.ledger_path.display(),
            blocks = snapshot.blocks.len(),
            bytes = bytes.len(),
            "saved ledger"
        );
        Ok(())
    }

    fn ledger_dir(&self) -> &Path {
        match self.ledger_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Each write gets its own temporary sibling, so concurrent or stale
    /// writes never share a half-written file.
    fn write_atomic(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let dir = self.ledger_dir();
        fs::create_dir_all(dir)?;

        let mut file = tempfile::Builder::new()
            .prefix(".ledger-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(&self.ledger_path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgr_chain::ClassRegistry;
    use ledgr_core::Identity;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, LedgerStore, AuthorizationSet, Chain) {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.dat"), dir.path().join("ledger.key"));
        let owner = Identity::generate("owner");
        let auth = AuthorizationSet::from_identities([owner]).unwrap();
        let chain = Chain::new(auth.clone(), ClassRegistry::standard(), "owner").unwrap();
        (dir, store, auth, chain)
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store, auth, chain) = fixture();
        store.init_key().unwrap();

        assert!(!store.exists());
        store.save(&chain).unwrap();
        assert!(store.exists());
        assert!(leftover_temp_files(&store).is_empty());

        let loaded = store.load(auth).unwrap();
        assert_eq!(loaded.blocks(), chain.blocks());
    }

    fn leftover_temp_files(store: &LedgerStore) -> Vec<PathBuf> {
        fs::read_dir(store.ledger_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "tmp"))
            .collect()
    }

    #[test]
    fn test_save_without_key() {
        let (_dir, store, _, chain) = fixture();
        assert!(matches!(store.save(&chain), Err(StorageError::KeyNotFound(_))));
        assert!(!store.exists());
    }

    #[test]
    fn test_overwrite_replaces_ledger() {
        let (_dir, store, auth, chain) = fixture();
        store.init_key().unwrap();
        store.save(&chain).unwrap();
        let first = fs::read(store.ledger_path()).unwrap();

        store.save(&chain).unwrap();
        let second = fs::read(store.ledger_path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.load(auth).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_async_roundtrip() {
        let (_dir, store, auth, chain) = fixture();
        store.init_key().unwrap();

        store.save_async(&chain).await.unwrap();
        let loaded = store.load_async(auth).await.unwrap();
        assert_eq!(loaded.last_hash(), chain.last_hash());
    }

    #[test]
    fn test_stale_temp_file_is_ignored() {
        let (_dir, store, auth, chain) = fixture();
        store.init_key().unwrap();
        let mut stale = store.ledger_path().as_os_str().to_owned();
        stale.push(".tmp");
        fs::write(&stale, b"half a ledger").unwrap();

        store.save(&chain).unwrap();
        assert_eq!(fs::read(&stale).unwrap(), b"half a ledger");
        assert_eq!(store.load(auth).unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_leave_a_whole_ledger() {
        let (_dir, store, auth, chain) = fixture();
        store.init_key().unwrap();
        let chain = std::sync::Arc::new(chain);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let chain = std::sync::Arc::clone(&chain);
                tokio::spawn(async move { store.save_async(&chain).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert!(leftover_temp_files(&store).is_empty());
        assert_eq!(store.load(auth).unwrap().blocks(), chain.blocks());
    }

    #[tokio::test]
    async fn test_async_timeout() {
        let (_dir, store, _, _) = fixture();
        let store = store.with_timeout(Duration::from_millis(10));

        let result = store
            .run_blocking(|| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(StorageError::Timeout(_))));
    }
}
