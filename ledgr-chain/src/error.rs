//! Ledger error types.

use std::fmt;

use ledgr_core::{Amount, CoreError};

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur when building, appending to, or auditing a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    // Append preconditions, in the order they are checked
    /// The block creator is not in the authorization set.
    UnauthorizedCreator { creator: String },

    /// An entry's sender is unknown or signed with a key other than the
    /// one registered for that name.
    UnauthorizedSender { index: usize, sender: String },

    /// Total debits and credits of the batch differ.
    UnbalancedEntries { debit: Amount, credit: Amount },

    /// Summing the batch overflowed the decimal range.
    AmountOverflow,

    /// An entry names a class the registry does not know.
    UnknownAccountingClass { class: String },

    /// An entry names an unregistered subclass under the strict policy.
    UnknownSubclass { class: String, subclass: String },

    /// An entry's timestamp is earlier than the one before it.
    OutOfOrderEntries { index: usize },

    /// An entry's signature does not verify. `block` is set when found by
    /// an audit of stored blocks.
    InvalidEntrySignature { block: Option<u64>, index: usize },

    /// The batch has no entries.
    EmptyBatch,

    // Structural errors
    /// A block's stored hash does not match its contents.
    HashMismatch { sequence: u64 },

    /// Blocks are not a well-formed chain starting at genesis.
    BrokenChain { sequence: u64, reason: &'static str },

    // Setup and runtime
    /// The identity named to sign genesis is not authorized.
    MissingGenesisIdentity { name: String },

    /// Two identities share a name in one authorization set.
    DuplicateIdentity { name: String },

    /// A thread panicked while holding the shared chain lock.
    LockPoisoned,

    /// Error from entry or block construction.
    Core(CoreError),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::UnauthorizedCreator { creator } => {
                write!(f, "creator '{creator}' is not authorized")
            }
            LedgerError::UnauthorizedSender { index, sender } => {
                write!(f, "entry {index}: sender '{sender}' is not authorized")
            }
            LedgerError::UnbalancedEntries { debit, credit } => {
                write!(f, "entries do not balance: debits {debit}, credits {credit}")
            }
            LedgerError::AmountOverflow => write!(f, "amount total overflowed"),
            LedgerError::UnknownAccountingClass { class } => {
                write!(f, "unknown accounting class '{class}'")
            }
            LedgerError::UnknownSubclass { class, subclass } => {
                write!(f, "unknown subclass '{subclass}' for class '{class}'")
            }
            LedgerError::OutOfOrderEntries { index } => {
                write!(f, "entry {index} is timestamped before its predecessor")
            }
            LedgerError::InvalidEntrySignature { block, index } => match block {
                Some(sequence) => {
                    write!(f, "invalid signature on entry {index} of block {sequence}")
                }
                None => write!(f, "invalid signature on entry {index}"),
            },
            LedgerError::EmptyBatch => write!(f, "batch contains no entries"),
            LedgerError::HashMismatch { sequence } => {
                write!(f, "block {sequence} hash does not match its contents")
            }
            LedgerError::BrokenChain { sequence, reason } => {
                write!(f, "broken chain at block {sequence}: {reason}")
            }
            LedgerError::MissingGenesisIdentity { name } => {
                write!(f, "genesis identity '{name}' is not in the authorization set")
            }
            LedgerError::DuplicateIdentity { name } => {
                write!(f, "identity '{name}' is already authorized")
            }
            LedgerError::LockPoisoned => write!(f, "ledger lock poisoned"),
            LedgerError::Core(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        LedgerError::Core(err)
    }
}
