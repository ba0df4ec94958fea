//! Signed ledger entries.
//!
//! An entry is one double-entry accounting fact: a debit and a credit
//! against a class/subclass, signed by the identity that recorded it. The
//! signature covers the canonical payload (every field except the signature
//! itself) and is produced at construction; entries never change afterwards.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::crypto::{verify, PublicKey, Signature};
use crate::error::{CoreError, EntryError};
use crate::identity::Identity;
use crate::serialization::serialize;

/// Caller-supplied part of an entry, before it is stamped and signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFields {
    /// Top-level accounting class, e.g. "Assets".
    pub class: String,
    /// Subclass within the class, e.g. "Cash".
    pub subclass: String,
    /// Debit amount, never negative.
    pub debit: Amount,
    /// Credit amount, never negative.
    pub credit: Amount,
    /// Free-text description.
    pub detail: Option<String>,
    /// Effective accounting date; the creation time when absent.
    pub accounting_date: Option<DateTime<Utc>>,
}

impl EntryFields {
    /// Fields with no detail and the default accounting date.
    pub fn new(
        class: impl Into<String>,
        subclass: impl Into<String>,
        debit: Amount,
        credit: Amount,
    ) -> Self {
        Self {
            class: class.into(),
            subclass: subclass.into(),
            debit,
            credit,
            detail: None,
            accounting_date: None,
        }
    }

    /// Attach a free-text detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set an explicit accounting date.
    pub fn with_accounting_date(mut self, date: DateTime<Utc>) -> Self {
        self.accounting_date = Some(date);
        self
    }

    fn check(&self) -> Result<(), EntryError> {
        if self.class.trim().is_empty() || self.subclass.trim().is_empty() {
            return Err(EntryError::EmptyClassification);
        }
        if self.debit.is_negative() {
            return Err(EntryError::NegativeAmount {
                side: "debit",
                amount: self.debit.canonical(),
            });
        }
        if self.credit.is_negative() {
            return Err(EntryError::NegativeAmount {
                side: "credit",
                amount: self.credit.canonical(),
            });
        }
        Ok(())
    }
}

/// A signed, immutable accounting entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Creation time, truncated to microseconds.
    pub timestamp: DateTime<Utc>,
    /// Effective accounting date.
    pub accounting_date: DateTime<Utc>,
    /// Name of the identity that signed the entry.
    pub sender: String,
    /// Public key of the signer at signing time.
    pub sender_key: PublicKey,
    /// Accounting class.
    pub class: String,
    /// Accounting subclass.
    pub subclass: String,
    /// Debit amount.
    pub debit: Amount,
    /// Credit amount.
    pub credit: Amount,
    /// Free-text detail.
    pub detail: Option<String>,
    /// Ed25519 signature over [`Entry::payload_bytes`].
    pub signature: Signature,
}

/// The signed part of an entry, in its fixed canonical field order.
#[derive(Serialize)]
struct EntryPayload<'a> {
    timestamp_micros: i64,
    accounting_date_micros: i64,
    sender: &'a str,
    sender_key: &'a PublicKey,
    class: &'a str,
    subclass: &'a str,
    debit: String,
    credit: String,
    detail: Option<&'a str>,
}

impl EntryPayload<'_> {
    fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serialize(self)?)
    }
}

impl Entry {
    /// Create and sign an entry stamped with the current time.
    pub fn create(sender: &Identity, fields: EntryFields) -> Result<Entry, CoreError> {
        Self::create_at(sender, fields, Utc::now())
    }

    /// Create and sign an entry with an explicit creation time.
    ///
    /// The timestamp is truncated to microseconds, the resolution of the
    /// signed payload.
    pub fn create_at(
        sender: &Identity,
        fields: EntryFields,
        timestamp: DateTime<Utc>,
    ) -> Result<Entry, CoreError> {
        fields.check()?;

        let timestamp = timestamp.trunc_subsecs(6);
        let accounting_date = fields.accounting_date.unwrap_or(timestamp).trunc_subsecs(6);
        let sender_key = sender.public_key();

        let payload = EntryPayload {
            timestamp_micros: timestamp.timestamp_micros(),
            accounting_date_micros: accounting_date.timestamp_micros(),
            sender: sender.name(),
            sender_key: &sender_key,
            class: &fields.class,
            subclass: &fields.subclass,
            debit: fields.debit.canonical(),
            credit: fields.credit.canonical(),
            detail: fields.detail.as_deref(),
        }
        .to_bytes()?;
        let signature = sender.sign(&payload)?;

        Ok(Entry {
            timestamp,
            accounting_date,
            sender: sender.name().to_string(),
            sender_key,
            class: fields.class,
            subclass: fields.subclass,
            debit: fields.debit,
            credit: fields.credit,
            detail: fields.detail,
            signature,
        })
    }

    /// Canonical bytes covered by the signature.
    ///
    /// Rebuilt from the stored fields, so any post-construction change to
    /// a field changes these bytes and breaks the signature.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, CoreError> {
        EntryPayload {
            timestamp_micros: self.timestamp.timestamp_micros(),
            accounting_date_micros: self.accounting_date.timestamp_micros(),
            sender: &self.sender,
            sender_key: &self.sender_key,
            class: &self.class,
            subclass: &self.subclass,
            debit: self.debit.canonical(),
            credit: self.credit.canonical(),
            detail: self.detail.as_deref(),
        }
        .to_bytes()
    }

    /// Verify the signature against the recorded sender key.
    pub fn verify_signature(&self) -> Result<(), CoreError> {
        let payload = self.payload_bytes()?;
        verify(&self.sender_key, &payload, &self.signature).map_err(CoreError::from)
    }

    /// True when the signature verifies.
    pub fn is_signature_valid(&self) -> bool {
        matches!(self.verify_signature(), Ok(()))
    }

    /// Whether this is a zero-value entry (both sides zero).
    pub fn is_zero_value(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn cash_debit(amount: i64) -> EntryFields {
        EntryFields::new("Assets", "Cash", Amount::from_units(amount), Amount::ZERO)
    }

    #[test]
    fn test_create_signs_entry() {
        let alice = Identity::generate("alice");
        let entry = Entry::create(&alice, cash_debit(100)).unwrap();

        assert_eq!(entry.sender, "alice");
        assert_eq!(entry.sender_key, alice.public_key());
        assert!(entry.verify_signature().is_ok());
    }

    #[test]
    fn test_accounting_date_defaults_to_timestamp() {
        let alice = Identity::generate("alice");
        let entry = Entry::create_at(&alice, cash_debit(5), at(0)).unwrap();
        assert_eq!(entry.accounting_date, entry.timestamp);

        let fields = cash_debit(5).with_accounting_date(at(-86_400));
        let explicit = Entry::create_at(&alice, fields, at(0)).unwrap();
        assert_eq!(explicit.accounting_date, at(-86_400));
        assert_eq!(explicit.timestamp, at(0));
    }

    #[test]
    fn test_zero_amounts_are_valid() {
        let alice = Identity::generate("alice");
        let entry = Entry::create(
            &alice,
            EntryFields::new("Assets", "Cash", Amount::ZERO, Amount::ZERO),
        )
        .unwrap();
        assert!(entry.is_zero_value());
        assert!(entry.is_signature_valid());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let alice = Identity::generate("alice");

        let result = Entry::create(&alice, cash_debit(-1));
        assert!(matches!(
            result,
            Err(CoreError::Entry(EntryError::NegativeAmount { side: "debit", .. }))
        ));

        let result = Entry::create(
            &alice,
            EntryFields::new("Revenue", "Sales", Amount::ZERO, Amount::from_units(-3)),
        );
        assert!(matches!(
            result,
            Err(CoreError::Entry(EntryError::NegativeAmount { side: "credit", .. }))
        ));
    }

    #[test]
    fn test_empty_class_rejected() {
        let alice = Identity::generate("alice");
        let result = Entry::create(
            &alice,
            EntryFields::new(" ", "Cash", Amount::ZERO, Amount::ZERO),
        );
        assert!(matches!(result, Err(CoreError::Entry(EntryError::EmptyClassification))));
    }

    #[test]
    fn test_any_field_change_breaks_signature() {
        let alice = Identity::generate("alice");
        let entry = Entry::create_at(&alice, cash_debit(100).with_detail("float"), at(0)).unwrap();

        let mut e = entry.clone();
        e.debit = Amount::from_units(101);
        assert!(!e.is_signature_valid());

        let mut e = entry.clone();
        e.subclass = "Inventory".into();
        assert!(!e.is_signature_valid());

        let mut e = entry.clone();
        e.detail = None;
        assert!(!e.is_signature_valid());

        let mut e = entry.clone();
        e.accounting_date = at(1);
        assert!(!e.is_signature_valid());

        let mut e = entry.clone();
        e.sender = "mallory".into();
        assert!(!e.is_signature_valid());

        let mut e = entry;
        e.sender_key = Identity::generate("alice").public_key();
        assert!(!e.is_signature_valid());
    }

    #[test]
    fn test_equivalent_amount_forms_sign_identically() {
        let alice = Identity::generate("alice");
        let a = Entry::create_at(
            &alice,
            EntryFields::new("Assets", "Cash", "100.00".parse().unwrap(), Amount::ZERO),
            at(0),
        )
        .unwrap();
        let b = Entry::create_at(
            &alice,
            EntryFields::new("Assets", "Cash", "100".parse().unwrap(), Amount::ZERO),
            at(0),
        )
        .unwrap();
        assert_eq!(a.payload_bytes().unwrap(), b.payload_bytes().unwrap());
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_timestamp_truncated_to_micros() {
        let alice = Identity::generate("alice");
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let entry = Entry::create_at(&alice, cash_debit(1), ts).unwrap();
        assert_eq!(entry.timestamp.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn test_serialization_roundtrip_keeps_signature_valid() {
        let alice = Identity::generate("alice");
        let entry = Entry::create(&alice, cash_debit(250).with_detail("deposit")).unwrap();

        let bytes = serialize(&entry).unwrap();
        let recovered: Entry = crate::serialization::deserialize(&bytes).unwrap();

        assert_eq!(entry, recovered);
        assert!(recovered.verify_signature().is_ok());
    }
}
