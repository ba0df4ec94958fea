//! Chain management for the ledgr accounting ledger.
//!
//! This crate implements:
//! - Genesis block creation
//! - Batch validation (authorization, balance, classification, ordering,
//!   signatures)
//! - The append-only chain with full re-hash audits and time-window queries
//! - The per-chain class registry and authorization set
//! - JSON import batches
//! - A thread-safe shared chain handle
//!
//! # Example
//!
//! ```
//! use ledgr_chain::{AuthorizationSet, Chain, ClassRegistry};
//! use ledgr_core::{Amount, Entry, EntryFields, Identity};
//!
//! let owner = Identity::generate("owner");
//! let auth = AuthorizationSet::from_identities([owner.clone()]).unwrap();
//! let mut chain = Chain::new(auth, ClassRegistry::standard(), "owner").unwrap();
//!
//! let entries = vec![
//!     Entry::create(&owner, EntryFields::new("Assets", "Cash", Amount::from_units(100), Amount::ZERO)).unwrap(),
//!     Entry::create(&owner, EntryFields::new("Revenue", "Sales", Amount::ZERO, Amount::from_units(100))).unwrap(),
//! ];
//! chain.append(entries, "owner").unwrap();
//!
//! assert_eq!(chain.len(), 2);
//! assert!(chain.validate_chain().is_valid());
//! ```

mod authorization;
mod chain;
mod error;
mod genesis;
mod import;
mod registry;
mod shared;
pub mod validation;

pub use authorization::AuthorizationSet;
pub use chain::{AuditFailure, AuditFailureKind, Chain, ChainAudit};
pub use error::{LedgerError, LedgerResult};
pub use genesis::{
    create_genesis_block, is_genesis_shaped, GENESIS_CLASS, GENESIS_DETAIL, GENESIS_SUBCLASS,
};
pub use import::{ImportBatch, ImportRecord};
pub use registry::{ClassRegistry, SubclassPolicy};
pub use shared::SharedChain;
pub use validation::{validate_batch, BatchPlan};
