//! Exact decimal amounts.
//!
//! Debits and credits are compared for exact equality when a batch is
//! balanced, so amounts are fixed-point decimals, never floats.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A monetary amount in the ledger's single implicit currency.
///
/// Equality is by value: `100`, `100.0` and `100.00` are the same amount and
/// share one canonical encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wrap a decimal value.
    pub fn new(value: Decimal) -> Self {
        Amount(value)
    }

    /// Whole units, e.g. `Amount::from_units(100)` is 100.
    pub fn from_units(units: i64) -> Self {
        Amount(Decimal::from(units))
    }

    /// Minor units with two decimal places, e.g. `from_cents(12_345)` is 123.45.
    pub fn from_cents(cents: i64) -> Self {
        Amount(Decimal::new(cents, 2))
    }

    /// The underlying decimal.
    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// True when the amount is below zero. Negative zero is not negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// True for any representation of zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Addition that reports overflow instead of panicking.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Sum an iterator of amounts, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Canonical text form: normalized (no trailing zeros), zero always `0`.
    ///
    /// This is the form that is signed, hashed and persisted.
    pub fn canonical(&self) -> String {
        if self.0.is_zero() {
            return "0".to_string();
        }
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Amount)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> serde::de::Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal amount as a string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
                Amount::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_drops_trailing_zeros() {
        assert_eq!(Amount::from_str("100.00").unwrap().canonical(), "100");
        assert_eq!(Amount::from_str("100").unwrap().canonical(), "100");
        assert_eq!(Amount::from_cents(12_350).canonical(), "123.5");
        assert_eq!(Amount::from_str("-0.00").unwrap().canonical(), "0");
    }

    #[test]
    fn test_equality_is_by_value() {
        assert_eq!(Amount::from_str("100.00").unwrap(), Amount::from_units(100));
        assert_eq!(Amount::from_cents(10), Amount::from_str("0.1").unwrap());
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        // 0.1 + 0.2 == 0.3 holds for decimals, not for f64.
        let total = Amount::checked_sum([
            Amount::from_str("0.1").unwrap(),
            Amount::from_str("0.2").unwrap(),
        ])
        .unwrap();
        assert_eq!(total, Amount::from_str("0.3").unwrap());
    }

    #[test]
    fn test_checked_sum_overflow() {
        let max = Amount::new(Decimal::MAX);
        assert!(Amount::checked_sum([max, max]).is_none());
        assert_eq!(Amount::checked_sum(Vec::new()), Some(Amount::ZERO));
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max.checked_add(Amount::from_units(1)), None);
        assert_eq!(
            Amount::from_cents(150).checked_add(Amount::from_cents(50)),
            Some(Amount::from_units(2))
        );
    }

    #[test]
    fn test_negative_detection() {
        assert!(Amount::from_units(-1).is_negative());
        assert!(!Amount::ZERO.is_negative());
        assert!(!Amount::from_str("-0").unwrap().is_negative());
    }

    #[test]
    fn test_serialization_uses_canonical_form() {
        let a = crate::serialization::serialize(&Amount::from_str("42.50").unwrap()).unwrap();
        let b = crate::serialization::serialize(&Amount::from_str("42.5").unwrap()).unwrap();
        assert_eq!(a, b);

        let recovered: Amount = crate::serialization::deserialize(&a).unwrap();
        assert_eq!(recovered, Amount::from_cents(4_250));
    }
}
