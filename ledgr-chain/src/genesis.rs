//! Genesis block creation.
//!
//! The genesis block is the first block of every ledger. It has:
//! - Sequence 1
//! - No previous hash (the zero sentinel is hashed in its place)
//! - A single zero-value entry against Assets/Cash
//! - The genesis identity as both creator and entry sender

use ledgr_core::{Amount, Block, Entry, EntryFields, Identity, Provenance};

use crate::error::LedgerResult;

/// Detail text of the genesis entry.
pub const GENESIS_DETAIL: &str = "Genesis block";

/// Class of the genesis entry.
pub const GENESIS_CLASS: &str = "Assets";

/// Subclass of the genesis entry.
pub const GENESIS_SUBCLASS: &str = "Cash";

/// Create a genesis block signed by `identity`.
pub fn create_genesis_block(identity: &Identity) -> LedgerResult<Block> {
    let entry = Entry::create(
        identity,
        EntryFields::new(GENESIS_CLASS, GENESIS_SUBCLASS, Amount::ZERO, Amount::ZERO)
            .with_detail(GENESIS_DETAIL),
    )?;

    Ok(Block::create(
        vec![entry],
        None,
        identity.name(),
        1,
        Provenance::Direct,
    )?)
}

/// Whether `block` has the shape of a genesis block.
///
/// Checks structure only; the hash is checked by chain validation.
pub fn is_genesis_shaped(block: &Block) -> bool {
    block.is_genesis() && block.entries.len() == 1 && block.entries[0].is_zero_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_block_shape() {
        let owner = Identity::generate("owner");
        let genesis = create_genesis_block(&owner).unwrap();

        assert_eq!(genesis.sequence, 1);
        assert!(genesis.previous_hash.is_none());
        assert_eq!(genesis.creator, "owner");
        assert_eq!(genesis.entries.len(), 1);

        let entry = &genesis.entries[0];
        assert_eq!(entry.class, GENESIS_CLASS);
        assert_eq!(entry.subclass, GENESIS_SUBCLASS);
        assert!(entry.is_zero_value());
        assert_eq!(entry.detail.as_deref(), Some(GENESIS_DETAIL));
        assert!(entry.verify_signature().is_ok());

        assert!(genesis.validate_self());
        assert!(is_genesis_shaped(&genesis));
    }

    #[test]
    fn test_non_genesis_rejected_by_shape_check() {
        let owner = Identity::generate("owner");
        let mut block = create_genesis_block(&owner).unwrap();
        block.sequence = 2;
        assert!(!is_genesis_shaped(&block));

        let mut block = create_genesis_block(&owner).unwrap();
        block.entries[0].debit = Amount::from_units(1);
        assert!(!is_genesis_shaped(&block));
    }
}
