//! Batch validation.
//!
//! Every batch offered to [`Chain::append`](crate::Chain::append) passes
//! these checks, in this order, before anything is mutated:
//! 1. the creator and every entry sender are authorized (sender keys must
//!    match the registered identity)
//! 2. total debits equal total credits exactly
//! 3. every class is known; unknown subclasses are either planned for
//!    registration or rejected, depending on [`SubclassPolicy`]
//! 4. entry timestamps are non-decreasing
//! 5. every entry signature verifies
//! 6. the batch is non-empty
//!
//! Validation never touches the chain. It returns a [`BatchPlan`] that the
//! chain applies once the block has been built.

use ledgr_core::{Amount, Entry};

use crate::authorization::AuthorizationSet;
use crate::error::{LedgerError, LedgerResult};
use crate::registry::{ClassRegistry, SubclassPolicy};

/// Side effects of accepting a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// `(class, subclass)` pairs to register, deduplicated, in first-seen order.
    pub new_subclasses: Vec<(String, String)>,
    /// Sum of debits (equal to the sum of credits).
    pub total: Amount,
}

/// Validate a batch against an authorization set and registry.
pub fn validate_batch(
    entries: &[Entry],
    creator: &str,
    authorization: &AuthorizationSet,
    registry: &ClassRegistry,
    policy: SubclassPolicy,
) -> LedgerResult<BatchPlan> {
    check_authorization(entries, creator, authorization)?;
    let total = check_balance(entries)?;
    let new_subclasses = check_classification(entries, registry, policy)?;
    check_ordering(entries)?;
    check_signatures(entries)?;
    if entries.is_empty() {
        return Err(LedgerError::EmptyBatch);
    }

    tracing::debug!(
        creator,
        entries = entries.len(),
        total = %total,
        "batch validated"
    );

    Ok(BatchPlan {
        new_subclasses,
        total,
    })
}

/// The creator and each sender must be authorized, and each entry must
/// carry the sender's registered key.
pub fn check_authorization(
    entries: &[Entry],
    creator: &str,
    authorization: &AuthorizationSet,
) -> LedgerResult<()> {
    if !authorization.contains(creator) {
        return Err(LedgerError::UnauthorizedCreator {
            creator: creator.to_string(),
        });
    }

    for (index, entry) in entries.iter().enumerate() {
        if !authorization.is_authorized_key(&entry.sender, &entry.sender_key) {
            return Err(LedgerError::UnauthorizedSender {
                index,
                sender: entry.sender.clone(),
            });
        }
    }

    Ok(())
}

/// Exact decimal comparison of total debits and credits.
///
/// Returns the balanced total.
pub fn check_balance(entries: &[Entry]) -> LedgerResult<Amount> {
    let debit = Amount::checked_sum(entries.iter().map(|e| e.debit))
        .ok_or(LedgerError::AmountOverflow)?;
    let credit = Amount::checked_sum(entries.iter().map(|e| e.credit))
        .ok_or(LedgerError::AmountOverflow)?;

    if debit != credit {
        return Err(LedgerError::UnbalancedEntries { debit, credit });
    }

    Ok(debit)
}

/// Every class must be registered. Returns the unknown subclasses to
/// register, or fails on the first one under [`SubclassPolicy::Strict`].
pub fn check_classification(
    entries: &[Entry],
    registry: &ClassRegistry,
    policy: SubclassPolicy,
) -> LedgerResult<Vec<(String, String)>> {
    let mut new_subclasses: Vec<(String, String)> = Vec::new();

    for entry in entries {
        if !registry.contains_class(&entry.class) {
            return Err(LedgerError::UnknownAccountingClass {
                class: entry.class.clone(),
            });
        }
        if registry.contains_subclass(&entry.class, &entry.subclass) {
            continue;
        }

        match policy {
            SubclassPolicy::Strict => {
                return Err(LedgerError::UnknownSubclass {
                    class: entry.class.clone(),
                    subclass: entry.subclass.clone(),
                });
            }
            SubclassPolicy::AutoRegister => {
                let pair = (entry.class.clone(), entry.subclass.clone());
                if !new_subclasses.contains(&pair) {
                    new_subclasses.push(pair);
                }
            }
        }
    }

    Ok(new_subclasses)
}

/// Entry timestamps must not decrease within the batch. Equal timestamps
/// are allowed.
pub fn check_ordering(entries: &[Entry]) -> LedgerResult<()> {
    for (index, pair) in entries.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(LedgerError::OutOfOrderEntries { index: index + 1 });
        }
    }
    Ok(())
}

/// Each entry's signature must verify against its recorded sender key.
pub fn check_signatures(entries: &[Entry]) -> LedgerResult<()> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.verify_signature().is_err() {
            return Err(LedgerError::InvalidEntrySignature { block: None, index });
        }
    }
    Ok(())
}
