//! Versioned ledger snapshot and the top-level save/load pair.
//!
//! A snapshot is plain data: the blocks and the class registry, with an
//! explicit format version in front. It is encoded with the deterministic
//! core codec and then sealed in an [`envelope`](crate::envelope).

use ledgr_chain::{AuthorizationSet, Chain, ClassRegistry};
use ledgr_core::serialization::{deserialize, serialize};
use ledgr_core::Block;
use serde::{Deserialize, Serialize};

use crate::envelope;
use crate::error::StorageError;
use crate::keystore::LedgerKey;

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Everything persisted about a ledger.
///
/// Identities are not part of a snapshot; the authorization set is supplied
/// again on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Layout version of this record.
    pub format_version: u16,
    /// Blocks in chain order, genesis first.
    pub blocks: Vec<Block>,
    /// The chain's class registry, including auto-registered subclasses.
    pub registry: ClassRegistry,
}

impl LedgerSnapshot {
    /// Copy the persistent parts of a chain.
    pub fn capture(chain: &Chain) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            blocks: chain.blocks().to_vec(),
            registry: chain.registry().clone(),
        }
    }

    /// Deterministic binary encoding.
    pub fn encode(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serialize(self)?)
    }

    /// Decode, rejecting unknown format versions before reading further.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let version_bytes: [u8; 2] = bytes
            .get(..2)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| StorageError::Deserialization("empty snapshot".into()))?;
        let version = u16::from_le_bytes(version_bytes);
        if version != SNAPSHOT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                what: "snapshot",
                version,
            });
        }
        Ok(deserialize(bytes)?)
    }

    /// Rebuild the chain, checking block structure.
    pub fn into_chain(self, authorization: AuthorizationSet) -> Result<Chain, StorageError> {
        Chain::from_blocks(self.blocks, authorization, self.registry)
            .map_err(|e| StorageError::Deserialization(e.to_string()))
    }
}

/// Serialize and encrypt a chain.
pub fn save(chain: &Chain, key: &LedgerKey) -> Result<Vec<u8>, StorageError> {
    seal_snapshot(&LedgerSnapshot::capture(chain), key)
}

/// Decrypt and rebuild a chain.
///
/// Fails with [`StorageError::Decryption`] on a wrong key or tampered file
/// and [`StorageError::Deserialization`] on malformed content. Never returns
/// a partial chain.
pub fn load(
    bytes: &[u8],
    key: &LedgerKey,
    authorization: AuthorizationSet,
) -> Result<Chain, StorageError> {
    let plaintext = envelope::open(bytes, key)?;
    let chain = LedgerSnapshot::decode(&plaintext)?.into_chain(authorization)?;
    tracing::debug!(blocks = chain.len(), "decoded ledger");
    Ok(chain)
}

pub(crate) fn seal_snapshot(
    snapshot: &LedgerSnapshot,
    key: &LedgerKey,
) -> Result<Vec<u8>, StorageError> {
    envelope::seal(&snapshot.encode()?, key)
}
