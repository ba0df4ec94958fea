//! Thread-safe handle to a chain.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use ledgr_core::{Block, Entry};

use crate::chain::{Chain, ChainAudit};
use crate::error::{LedgerError, LedgerResult};

/// A chain shared between threads.
///
/// Appends take the write lock, so reading the last hash and pushing the
/// new block happen as one step. Readers take the read lock and never see
/// a chain mid-append.
#[derive(Clone, Debug)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    /// Wrap a chain.
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    fn read_lock(&self) -> LedgerResult<RwLockReadGuard<'_, Chain>> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_lock(&self) -> LedgerResult<RwLockWriteGuard<'_, Chain>> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Append a batch; returns the new block's sequence.
    pub fn append(&self, entries: Vec<Entry>, creator: &str) -> LedgerResult<u64> {
        let mut chain = self.write_lock()?;
        chain.append(entries, creator).map(|block| block.sequence)
    }

    /// Append an import batch; returns the new block's sequence.
    pub fn append_imported(
        &self,
        entries: Vec<Entry>,
        creator: &str,
        source_label: Option<String>,
    ) -> LedgerResult<u64> {
        let mut chain = self.write_lock()?;
        chain
            .append_imported(entries, creator, source_label)
            .map(|block| block.sequence)
    }

    /// Audit the chain under the read lock.
    pub fn validate_chain(&self) -> LedgerResult<ChainAudit> {
        Ok(self.read_lock()?.validate_chain())
    }

    /// Copies of the blocks in `[start, end]`.
    pub fn blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<Block>> {
        Ok(self.read_lock()?.blocks_in_range(start, end).cloned().collect())
    }

    /// Copy of every block.
    pub fn snapshot(&self) -> LedgerResult<Vec<Block>> {
        Ok(self.read_lock()?.blocks().to_vec())
    }

    /// Number of blocks.
    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.read_lock()?.len())
    }

    /// Run `f` with shared access to the chain.
    pub fn read<T>(&self, f: impl FnOnce(&Chain) -> T) -> LedgerResult<T> {
        Ok(f(&*self.read_lock()?))
    }

    /// Unwrap the chain if this is the last handle.
    pub fn into_inner(self) -> Option<Chain> {
        Arc::try_unwrap(self.inner)
            .ok()
            .and_then(|lock| lock.into_inner().ok())
    }
}
