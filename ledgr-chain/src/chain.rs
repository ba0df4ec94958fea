//! The ledger chain.

use chrono::{DateTime, Utc};
use ledgr_core::{Block, Entry, Hash, Provenance};

use crate::authorization::AuthorizationSet;
use crate::error::{LedgerError, LedgerResult};
use crate::genesis::{create_genesis_block, is_genesis_shaped};
use crate::registry::{ClassRegistry, SubclassPolicy};
use crate::validation::{validate_batch, BatchPlan};

/// Why an audit stopped at a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditFailureKind {
    /// The stored hash differs from the recomputed one.
    HashMismatch,
    /// The previous-hash link or the sequence number is wrong.
    BrokenLink,
}

/// The first block an audit found to be invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuditFailure {
    /// Zero-based position in the chain.
    pub index: usize,
    /// Sequence number stored in the block.
    pub sequence: u64,
    /// What was wrong.
    pub kind: AuditFailureKind,
}

/// Result of [`Chain::validate_chain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainAudit {
    /// Number of blocks examined, including the failing one.
    pub blocks_checked: usize,
    /// The first failure, if any.
    pub failure: Option<AuditFailure>,
}

impl ChainAudit {
    /// True when every block re-hashed and linked correctly.
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert into a `Result`, mapping a failure to the matching error.
    pub fn into_result(self) -> LedgerResult<()> {
        match self.failure {
            None => Ok(()),
            Some(AuditFailure {
                sequence,
                kind: AuditFailureKind::HashMismatch,
                ..
            }) => Err(LedgerError::HashMismatch { sequence }),
            Some(AuditFailure {
                sequence,
                kind: AuditFailureKind::BrokenLink,
                ..
            }) => Err(LedgerError::BrokenChain {
                sequence,
                reason: "previous hash or sequence does not follow its predecessor",
            }),
        }
    }
}

/// An append-only, hash-linked sequence of validated blocks.
///
/// The first block is always genesis. Blocks are never modified or removed
/// once appended, and a rejected append leaves the chain unchanged.
#[derive(Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    authorization: AuthorizationSet,
    registry: ClassRegistry,
    policy: SubclassPolicy,
}

impl Chain {
    /// Start a new ledger whose genesis block is signed by `genesis_identity`.
    pub fn new(
        authorization: AuthorizationSet,
        registry: ClassRegistry,
        genesis_identity: &str,
    ) -> LedgerResult<Self> {
        let identity = authorization.get(genesis_identity).ok_or_else(|| {
            LedgerError::MissingGenesisIdentity {
                name: genesis_identity.to_string(),
            }
        })?;
        let genesis = create_genesis_block(identity)?;

        tracing::info!(
            creator = genesis_identity,
            hash = %genesis.hash_hex(),
            "created ledger"
        );

        Ok(Self {
            blocks: vec![genesis],
            authorization,
            registry,
            policy: SubclassPolicy::default(),
        })
    }

    /// Rebuild a chain from stored blocks.
    ///
    /// Checks structure only: a genesis-shaped first block, contiguous
    /// sequences, and previous-hash links that match the stored hashes.
    /// Content hashes are not recomputed here; use
    /// [`validate_chain`](Self::validate_chain) for that.
    pub fn from_blocks(
        blocks: Vec<Block>,
        authorization: AuthorizationSet,
        registry: ClassRegistry,
    ) -> LedgerResult<Self> {
        let first = blocks.first().ok_or(LedgerError::BrokenChain {
            sequence: 0,
            reason: "no blocks",
        })?;
        if !is_genesis_shaped(first) {
            return Err(LedgerError::BrokenChain {
                sequence: first.sequence,
                reason: "first block is not a genesis block",
            });
        }

        for pair in blocks.windows(2) {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.sequence != prev.sequence + 1 {
                return Err(LedgerError::BrokenChain {
                    sequence: block.sequence,
                    reason: "sequence is not contiguous",
                });
            }
            if block.previous_hash != Some(prev.hash) {
                return Err(LedgerError::BrokenChain {
                    sequence: block.sequence,
                    reason: "previous hash does not match",
                });
            }
        }

        tracing::debug!(blocks = blocks.len(), "rebuilt chain from stored blocks");

        Ok(Self {
            blocks,
            authorization,
            registry,
            policy: SubclassPolicy::default(),
        })
    }

    /// Set how unknown subclasses are handled on append.
    pub fn with_policy(mut self, policy: SubclassPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current subclass policy.
    pub fn policy(&self) -> SubclassPolicy {
        self.policy
    }

    /// Validate `entries` and append them as a new block by `creator`.
    ///
    /// Any failed check aborts the append and leaves the chain untouched.
    pub fn append(&mut self, entries: Vec<Entry>, creator: &str) -> LedgerResult<&Block> {
        self.append_with(entries, creator, Provenance::Direct)
    }

    /// Append entries that came from an import batch.
    ///
    /// Goes through the same validation as [`append`](Self::append); only
    /// the block's provenance differs.
    pub fn append_imported(
        &mut self,
        entries: Vec<Entry>,
        creator: &str,
        source_label: Option<String>,
    ) -> LedgerResult<&Block> {
        self.append_with(entries, creator, Provenance::Imported { source_label })
    }

    fn append_with(
        &mut self,
        entries: Vec<Entry>,
        creator: &str,
        provenance: Provenance,
    ) -> LedgerResult<&Block> {
        let plan = validate_batch(
            &entries,
            creator,
            &self.authorization,
            &self.registry,
            self.policy,
        )?;

        let (previous_hash, sequence) = {
            let last = self.last_block();
            (last.hash, last.sequence + 1)
        };
        let block = Block::create(entries, Some(previous_hash), creator, sequence, provenance)?;

        self.apply_plan(&plan);
        tracing::info!(
            sequence,
            creator,
            entries = block.entry_count(),
            total = %plan.total,
            imported = block.provenance.is_imported(),
            "appended block"
        );

        self.blocks.push(block);
        Ok(self.last_block())
    }

    fn apply_plan(&mut self, plan: &BatchPlan) {
        for (class, subclass) in &plan.new_subclasses {
            if self.registry.register_subclass(class, subclass.as_str()) {
                tracing::warn!(class = %class, subclass = %subclass, "registered new subclass");
            }
        }
    }

    /// Re-hash every block and check every link.
    ///
    /// Stops at the first failure and reports where it is. Never repairs.
    pub fn validate_chain(&self) -> ChainAudit {
        let mut previous: Option<&Block> = None;

        for (index, block) in self.blocks.iter().enumerate() {
            let linked = match previous {
                None => block.previous_hash.is_none() && block.sequence == 1,
                Some(prev) => {
                    block.previous_hash == Some(prev.hash) && block.sequence == prev.sequence + 1
                }
            };

            let kind = if !block.validate_self() {
                Some(AuditFailureKind::HashMismatch)
            } else if !linked {
                Some(AuditFailureKind::BrokenLink)
            } else {
                None
            };

            if let Some(kind) = kind {
                tracing::warn!(index, sequence = block.sequence, ?kind, "chain audit failed");
                return ChainAudit {
                    blocks_checked: index + 1,
                    failure: Some(AuditFailure {
                        index,
                        sequence: block.sequence,
                        kind,
                    }),
                };
            }
            previous = Some(block);
        }

        ChainAudit {
            blocks_checked: self.blocks.len(),
            failure: None,
        }
    }

    /// Re-verify every entry signature against its recorded sender key.
    pub fn audit_signatures(&self) -> LedgerResult<()> {
        for block in &self.blocks {
            for (index, entry) in block.entries.iter().enumerate() {
                if entry.verify_signature().is_err() {
                    tracing::warn!(sequence = block.sequence, index, "entry signature invalid");
                    return Err(LedgerError::InvalidEntrySignature {
                        block: Some(block.sequence),
                        index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Blocks whose timestamp lies in `[start, end]`, in chain order.
    ///
    /// An empty range (`start > end`) yields nothing.
    pub fn blocks_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(move |block| block.timestamp >= start && block.timestamp <= end)
    }

    /// Entries whose accounting date lies in `[start, end]`, with the
    /// sequence of the block holding them.
    pub fn entries_in_accounting_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = (u64, &Entry)> {
        self.blocks.iter().flat_map(move |block| {
            block
                .entries
                .iter()
                .filter(move |entry| entry.accounting_date >= start && entry.accounting_date <= end)
                .map(move |entry| (block.sequence, entry))
        })
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recently appended block.
    pub fn last_block(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Hash of the most recent block.
    pub fn last_hash(&self) -> Hash {
        self.last_block().hash
    }

    /// The genesis block.
    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// Block by sequence number.
    pub fn get(&self, sequence: u64) -> Option<&Block> {
        let index = usize::try_from(sequence.checked_sub(1)?).ok()?;
        self.blocks.get(index)
    }

    /// The chain's class registry.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The chain's authorization set.
    pub fn authorization(&self) -> &AuthorizationSet {
        &self.authorization
    }
}
