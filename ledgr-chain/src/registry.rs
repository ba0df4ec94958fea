//! Accounting classes and their subclasses.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Default class registry, applied to every new ledger.
const STANDARD_CLASSES: &[(&str, &[&str])] = &[
    ("Assets", &["Cash", "Accounts Receivable", "Inventory"]),
    (
        "Liabilities",
        &["Accounts Payable", "Loans Payable", "Accrued Expenses"],
    ),
    ("Equity", &["Owner's Capital", "Retained Earnings"]),
    ("Revenue", &["Sales", "Service Revenue"]),
    (
        "Expenses",
        &["Rent Expense", "Salaries Expense", "Utilities Expense"],
    ),
];

/// What append does with a subclass the registry has not seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubclassPolicy {
    /// Register it under its (known) class once the batch is accepted.
    #[default]
    AutoRegister,
    /// Reject the batch.
    Strict,
}

/// Map of class name to permitted subclasses.
///
/// Owned by a single chain and persisted with it. Append-only: classes and
/// subclasses can be added, never removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRegistry {
    classes: BTreeMap<String, BTreeSet<String>>,
}

impl ClassRegistry {
    /// A registry with no classes.
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// The standard chart: Assets, Liabilities, Equity, Revenue, Expenses.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (class, subclasses) in STANDARD_CLASSES {
            registry.register_class(*class);
            for subclass in *subclasses {
                registry.register_subclass(class, *subclass);
            }
        }
        registry
    }

    /// Add a class. Returns false if it already existed.
    pub fn register_class(&mut self, class: impl Into<String>) -> bool {
        let class = class.into();
        if self.classes.contains_key(&class) {
            return false;
        }
        self.classes.insert(class, BTreeSet::new());
        true
    }

    /// Add a subclass under an existing class.
    ///
    /// Returns true if it was newly added, false if it was already present
    /// or the class is unknown.
    pub fn register_subclass(&mut self, class: &str, subclass: impl Into<String>) -> bool {
        match self.classes.get_mut(class) {
            Some(subclasses) => subclasses.insert(subclass.into()),
            None => false,
        }
    }

    /// Whether `class` is registered.
    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Whether `subclass` is registered under `class`.
    pub fn contains_subclass(&self, class: &str, subclass: &str) -> bool {
        self.classes
            .get(class)
            .map(|subclasses| subclasses.contains(subclass))
            .unwrap_or(false)
    }

    /// Subclasses of `class` in sorted order, `None` for an unknown class.
    pub fn subclasses(&self, class: &str) -> Option<impl Iterator<Item = &str>> {
        self.classes
            .get(class)
            .map(|subclasses| subclasses.iter().map(String::as_str))
    }

    /// Registered class names in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
