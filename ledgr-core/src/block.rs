//! Hash-linked blocks of ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::sha256_concat;
use crate::entry::Entry;
use crate::error::CoreError;
use crate::serialization::serialize;
use crate::Hash;

/// Stand-in for the previous hash when hashing the genesis block.
pub const GENESIS_SENTINEL: Hash = [0u8; 32];

/// How a block's entries reached the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Posted directly by the creator.
    #[default]
    Direct,
    /// Brought in from an external import batch.
    Imported {
        /// Free-form label naming the source of the batch.
        source_label: Option<String>,
    },
}

impl Provenance {
    /// Whether the block came from an import batch.
    pub fn is_imported(&self) -> bool {
        matches!(self, Provenance::Imported { .. })
    }
}

/// A sealed batch of entries linked to its predecessor by hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// When the block was created. Not covered by the hash.
    pub timestamp: DateTime<Utc>,

    /// Entries in the order they were appended.
    pub entries: Vec<Entry>,

    /// Hash of the preceding block; `None` for genesis.
    pub previous_hash: Option<Hash>,

    /// 1-based position in the chain.
    pub sequence: u64,

    /// Content hash, see [`Block::compute_hash`].
    pub hash: Hash,

    /// Name of the identity that appended the block.
    pub creator: String,

    /// Direct post or import. Not covered by the hash.
    pub provenance: Provenance,
}

impl Block {
    /// Seal `entries` into a new block stamped with the current time.
    pub fn create(
        entries: Vec<Entry>,
        previous_hash: Option<Hash>,
        creator: impl Into<String>,
        sequence: u64,
        provenance: Provenance,
    ) -> Result<Block, CoreError> {
        let creator = creator.into();
        let hash = Self::compute_hash(&entries, previous_hash.as_ref(), sequence, &creator)?;

        Ok(Block {
            timestamp: Utc::now(),
            entries,
            previous_hash,
            sequence,
            hash,
            creator,
            provenance,
        })
    }

    /// Compute a block hash from its parts.
    ///
    /// `SHA-256(bincode(entries) || previous_hash or GENESIS_SENTINEL ||
    /// sequence as u64 LE || creator bytes)`.
    pub fn compute_hash(
        entries: &[Entry],
        previous_hash: Option<&Hash>,
        sequence: u64,
        creator: &str,
    ) -> Result<Hash, CoreError> {
        let encoded = serialize(&entries)?;
        let previous = previous_hash.unwrap_or(&GENESIS_SENTINEL);

        Ok(sha256_concat(&[
            encoded.as_slice(),
            previous.as_slice(),
            &sequence.to_le_bytes()[..],
            creator.as_bytes(),
        ]))
    }

    /// Recompute the hash from the stored fields.
    pub fn recompute_hash(&self) -> Result<Hash, CoreError> {
        Self::compute_hash(
            &self.entries,
            self.previous_hash.as_ref(),
            self.sequence,
            &self.creator,
        )
    }

    /// True when the stored hash matches the block's current contents.
    pub fn validate_self(&self) -> bool {
        matches!(self.recompute_hash(), Ok(h) if h == self.hash)
    }

    /// Check if this is a genesis block.
    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.sequence == 1 && self.previous_hash.is_none()
    }

    /// Lowercase hex of the block hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::entry::EntryFields;
    use crate::identity::Identity;

    fn sale(who: &Identity, amount: i64) -> Vec<Entry> {
        vec![
            Entry::create(
                who,
                EntryFields::new("Assets", "Cash", Amount::from_units(amount), Amount::ZERO),
            )
            .unwrap(),
            Entry::create(
                who,
                EntryFields::new("Revenue", "Sales", Amount::ZERO, Amount::from_units(amount)),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_create_computes_hash() {
        let alice = Identity::generate("alice");
        let block = Block::create(sale(&alice, 100), None, "alice", 1, Provenance::Direct).unwrap();

        assert!(block.validate_self());
        assert!(block.is_genesis());
        assert_eq!(block.entry_count(), 2);
        assert_eq!(block.hash_hex().len(), 64);
    }

    #[test]
    fn test_hash_is_reproducible_without_context() {
        let alice = Identity::generate("alice");
        let entries = sale(&alice, 100);
        let prev = [7u8; 32];

        let a = Block::compute_hash(&entries, Some(&prev), 2, "alice").unwrap();
        let b = Block::compute_hash(&entries, Some(&prev), 2, "alice").unwrap();
        assert_eq!(a, b);

        let block = Block::create(entries, Some(prev), "alice", 2, Provenance::Direct).unwrap();
        assert_eq!(block.hash, a);
    }

    #[test]
    fn test_genesis_uses_zero_sentinel() {
        let alice = Identity::generate("alice");
        let entries = sale(&alice, 1);

        let none = Block::compute_hash(&entries, None, 1, "alice").unwrap();
        let zeros = Block::compute_hash(&entries, Some(&GENESIS_SENTINEL), 1, "alice").unwrap();
        assert_eq!(none, zeros);
    }

    #[test]
    fn test_hash_covers_every_hashed_field() {
        let alice = Identity::generate("alice");
        let entries = sale(&alice, 100);
        let base = Block::compute_hash(&entries, None, 1, "alice").unwrap();

        assert_ne!(base, Block::compute_hash(&entries, Some(&[1u8; 32]), 1, "alice").unwrap());
        assert_ne!(base, Block::compute_hash(&entries, None, 2, "alice").unwrap());
        assert_ne!(base, Block::compute_hash(&entries, None, 1, "bob").unwrap());

        let mut reversed = entries.clone();
        reversed.reverse();
        assert_ne!(base, Block::compute_hash(&reversed, None, 1, "alice").unwrap());
    }

    #[test]
    fn test_tampered_entry_fails_self_check() {
        let alice = Identity::generate("alice");
        let mut block =
            Block::create(sale(&alice, 100), None, "alice", 1, Provenance::Direct).unwrap();

        block.entries[0].debit = Amount::from_units(1_000);
        assert!(!block.validate_self());
    }

    #[test]
    fn test_timestamp_and_provenance_not_hashed() {
        let alice = Identity::generate("alice");
        let mut block =
            Block::create(sale(&alice, 100), None, "alice", 1, Provenance::Direct).unwrap();

        block.provenance = Provenance::Imported {
            source_label: Some("bank.json".into()),
        };
        block.timestamp = block.timestamp + chrono::Duration::days(1);
        assert!(block.validate_self());
        assert!(block.provenance.is_imported());
    }

    #[test]
    fn test_block_serialization_roundtrip() {
        let alice = Identity::generate("alice");
        let block = Block::create(
            sale(&alice, 42),
            Some([3u8; 32]),
            "alice",
            5,
            Provenance::Imported { source_label: None },
        )
        .unwrap();

        let bytes = serialize(&block).unwrap();
        let recovered: Block = crate::serialization::deserialize(&bytes).unwrap();

        assert_eq!(block, recovered);
        assert!(recovered.validate_self());
    }
}
