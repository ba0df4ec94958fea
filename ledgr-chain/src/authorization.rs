//! The set of identities allowed to write to a ledger.

use std::collections::BTreeMap;

use ledgr_core::{Identity, PublicKey};

use crate::error::{LedgerError, LedgerResult};

/// Named identities authorized to create blocks and sign entries.
///
/// Passed explicitly to a chain at construction; there is no global
/// registry of users.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationSet {
    identities: BTreeMap<String, Identity>,
}

impl AuthorizationSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from identities, rejecting duplicate names.
    pub fn from_identities<I>(identities: I) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = Identity>,
    {
        let mut set = Self::new();
        for identity in identities {
            set.insert(identity)?;
        }
        Ok(set)
    }

    /// Add an identity. Names are unique within a set.
    pub fn insert(&mut self, identity: Identity) -> LedgerResult<()> {
        if self.identities.contains_key(identity.name()) {
            return Err(LedgerError::DuplicateIdentity {
                name: identity.name().to_string(),
            });
        }
        self.identities.insert(identity.name().to_string(), identity);
        Ok(())
    }

    /// Look up an identity by name.
    pub fn get(&self, name: &str) -> Option<&Identity> {
        self.identities.get(name)
    }

    /// Whether `name` is authorized.
    pub fn contains(&self, name: &str) -> bool {
        self.identities.contains_key(name)
    }

    /// Authorized names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.identities.keys().map(String::as_str)
    }

    /// Number of authorized identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// True when `name` is authorized and its registered key is `key`.
    pub fn is_authorized_key(&self, name: &str, key: &PublicKey) -> bool {
        self.identities
            .get(name)
            .map(|identity| identity.public_key() == *key)
            .unwrap_or(false)
    }
}
