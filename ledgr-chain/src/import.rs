//! Import batches.
//!
//! An import batch is a JSON document of unsigned records from an external
//! source. Each record is signed by the identity it names, then the whole
//! batch is appended through normal validation.
//!
//! ```json
//! {
//!   "source_label": "bank-2024-03.json",
//!   "records": [
//!     { "sender": "alice", "class": "Assets", "subclass": "Cash",
//!       "debit": "250.00", "credit": "0", "detail": "March deposit" },
//!     { "sender": "alice", "class": "Revenue", "subclass": "Sales",
//!       "debit": 0, "credit": 250 }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use ledgr_core::{Amount, Block, Entry, EntryFields};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::authorization::AuthorizationSet;
use crate::chain::Chain;
use crate::error::{LedgerError, LedgerResult};

/// One unsigned entry in an import batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Name of the identity that will sign the entry.
    pub sender: String,
    pub class: String,
    pub subclass: String,
    /// Accepts JSON numbers or decimal strings.
    pub debit: Decimal,
    pub credit: Decimal,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub accounting_date: Option<DateTime<Utc>>,
}

impl ImportRecord {
    fn into_fields(self) -> EntryFields {
        let mut fields = EntryFields::new(
            self.class,
            self.subclass,
            Amount::new(self.debit),
            Amount::new(self.credit),
        );
        fields.detail = self.detail;
        fields.accounting_date = self.accounting_date;
        fields
    }
}

/// A labelled set of records imported together as one block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    /// Where the records came from, kept in the block's provenance.
    #[serde(default)]
    pub source_label: Option<String>,
    pub records: Vec<ImportRecord>,
}

impl ImportBatch {
    /// Parse a batch from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sign every record with its named identity.
    ///
    /// All entries share one creation timestamp, so batch order is kept.
    pub fn into_entries(self, authorization: &AuthorizationSet) -> LedgerResult<Vec<Entry>> {
        let now = Utc::now();
        self.records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let identity = authorization.get(&record.sender).ok_or_else(|| {
                    LedgerError::UnauthorizedSender {
                        index,
                        sender: record.sender.clone(),
                    }
                })?;
                Ok(Entry::create_at(identity, record.into_fields(), now)?)
            })
            .collect()
    }
}

impl Chain {
    /// Sign and append a batch as one directly posted block by `creator`.
    ///
    /// The batch's source label is ignored.
    pub fn post(&mut self, batch: ImportBatch, creator: &str) -> LedgerResult<&Block> {
        let entries = self.sign_batch(batch, creator)?;
        self.append(entries, creator)
    }

    /// Sign and append an import batch as one block by `creator`.
    pub fn import(&mut self, batch: ImportBatch, creator: &str) -> LedgerResult<&Block> {
        let source_label = batch.source_label.clone();
        let entries = self.sign_batch(batch, creator)?;
        tracing::debug!(
            creator,
            records = entries.len(),
            source = source_label.as_deref().unwrap_or("-"),
            "importing batch"
        );
        self.append_imported(entries, creator, source_label)
    }

    /// An unknown creator is reported before any record is signed.
    fn sign_batch(&self, batch: ImportBatch, creator: &str) -> LedgerResult<Vec<Entry>> {
        if !self.authorization().contains(creator) {
            return Err(LedgerError::UnauthorizedCreator {
                creator: creator.to_string(),
            });
        }
        batch.into_entries(self.authorization())
    }
}
