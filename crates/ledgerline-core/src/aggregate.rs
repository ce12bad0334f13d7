//! Ordered running totals and their merge.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// A running total left the range of [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("total for {key:?} overflowed")]
pub struct OverflowError {
    /// The key whose total overflowed.
    pub key: String,
}

impl OverflowError {
    /// Create an overflow error for a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Add two amounts, naming `key` if the sum overflows.
pub fn checked_add(key: &str, a: Decimal, b: Decimal) -> Result<Decimal, OverflowError> {
    a.checked_add(b).ok_or_else(|| OverflowError::new(key))
}

/// An insertion-ordered map from report key to running total.
///
/// Iteration yields keys in the order they were first inserted. The account
/// report relies on this to print accounts in first-seen order.
///
/// Equality compares the key set and totals, not the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Aggregate {
    totals: IndexMap<String, Decimal>,
}

impl Aggregate {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregate with every key present at zero.
    pub fn zeroed<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            totals: keys.into_iter().map(|k| (k.into(), Decimal::ZERO)).collect(),
        }
    }

    /// Add `amount` to `key`, inserting the key at the end if it is new.
    ///
    /// On overflow the total is left unchanged.
    pub fn add(&mut self, key: &str, amount: Decimal) -> Result<(), OverflowError> {
        if let Some(total) = self.totals.get_mut(key) {
            *total = checked_add(key, *total, amount)?;
        } else {
            self.totals.insert(key.to_owned(), amount);
        }
        Ok(())
    }

    /// Add `amount` to `key` only if the key is already present.
    ///
    /// Returns whether the key was present.
    pub fn add_existing(&mut self, key: &str, amount: Decimal) -> Result<bool, OverflowError> {
        match self.totals.get_mut(key) {
            Some(total) => {
                *total = checked_add(key, *total, amount)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get the total for a key.
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.totals.get(key).copied()
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.totals.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterate over `(key, total)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.totals.keys().map(String::as_str)
    }

    /// Fold another aggregate into this one.
    ///
    /// Keys new to `self` are appended in the order they appear in `other`.
    pub fn absorb(&mut self, other: Self) -> Result<(), OverflowError> {
        for (key, amount) in other.totals {
            self.add(&key, amount)?;
        }
        Ok(())
    }
}

/// Merge partial aggregates into one by summing over the union of keys.
///
/// The identity is the empty aggregate. Totals do not depend on how the
/// input was partitioned or on the order of `partials`; key order follows
/// first appearance in the order given.
pub fn merge<I>(partials: I) -> Result<Aggregate, OverflowError>
where
    I: IntoIterator<Item = Aggregate>,
{
    merge_into(Aggregate::new(), partials)
}

/// Merge partial aggregates on top of a starting aggregate.
///
/// Used with a zero-seeded start so the statement keeps its full key set even
/// when there are no partials at all.
pub fn merge_into<I>(start: Aggregate, partials: I) -> Result<Aggregate, OverflowError>
where
    I: IntoIterator<Item = Aggregate>,
{
    partials.into_iter().try_fold(start, |mut total, partial| {
        total.absorb(partial)?;
        Ok(total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn agg(pairs: &[(&str, Decimal)]) -> Aggregate {
        let mut a = Aggregate::new();
        for (k, v) in pairs {
            a.add(k, *v).unwrap();
        }
        a
    }

    #[test]
    fn test_add_keeps_first_seen_order() {
        let mut a = Aggregate::new();
        a.add("Rent Expense", dec!(10)).unwrap();
        a.add("Cash", dec!(5)).unwrap();
        a.add("Rent Expense", dec!(1)).unwrap();

        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["Rent Expense", "Cash"]);
        assert_eq!(a.get("Rent Expense"), Some(dec!(11)));
    }

    #[test]
    fn test_add_existing_ignores_unknown() {
        let mut a = Aggregate::zeroed(["Cash"]);
        assert!(a.add_existing("Cash", dec!(3)).unwrap());
        assert!(!a.add_existing("Mystery", dec!(3)).unwrap());
        assert_eq!(a.len(), 1);
        assert_eq!(a.get("Cash"), Some(dec!(3)));
    }

    #[test]
    fn test_merge_empty_is_identity() {
        assert!(merge(Vec::new()).unwrap().is_empty());

        let a = agg(&[("Cash", dec!(1))]);
        assert_eq!(merge([a.clone(), Aggregate::new()]).unwrap(), a);
        assert_eq!(merge([Aggregate::new(), a.clone()]).unwrap(), a);
    }

    #[test]
    fn test_merge_sums_union_of_keys() {
        let a = agg(&[("Cash", dec!(100)), ("Inventory", dec!(5))]);
        let b = agg(&[("Cash", dec!(-40)), ("Loan Payable", dec!(-20))]);

        let merged = merge([a, b]).unwrap();
        assert_eq!(merged.get("Cash"), Some(dec!(60)));
        assert_eq!(merged.get("Inventory"), Some(dec!(5)));
        assert_eq!(merged.get("Loan Payable"), Some(dec!(-20)));
        assert_eq!(
            merged.keys().collect::<Vec<_>>(),
            vec!["Cash", "Inventory", "Loan Payable"]
        );
    }

    #[test]
    fn test_merge_into_keeps_seed_keys() {
        let seed = Aggregate::zeroed(["Cash", "Inventory"]);
        let merged = merge_into(seed, Vec::new()).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("Inventory"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut a = Aggregate::new();
        a.add("Cash", Decimal::MAX).unwrap();
        let err = a.add("Cash", dec!(1)).unwrap_err();
        assert_eq!(err, OverflowError::new("Cash"));
        assert_eq!(a.get("Cash"), Some(Decimal::MAX));

        let mut seeded = Aggregate::zeroed(["Cash"]);
        seeded.add_existing("Cash", Decimal::MIN).unwrap();
        assert!(seeded.add_existing("Cash", dec!(-1)).is_err());
    }

    #[test]
    fn test_merge_overflow_is_an_error() {
        let half = dec!(70000000000000000000000000000);
        let a = agg(&[("Cash", half)]);
        let b = agg(&[("Cash", half)]);
        assert_eq!(merge([a, b]).unwrap_err().key, "Cash");
    }
}
