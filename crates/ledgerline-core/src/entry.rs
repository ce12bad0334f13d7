//! Ledger entry parsing.
//!
//! Ledger lines are positional: `date,account,<unused>,debit,credit`. There is
//! no quoting or escaping, so a comma inside a field is not supported.

use rust_decimal::Decimal;
use std::str::FromStr;

/// One parsed ledger line.
///
/// Borrows its text fields from the line it was parsed from so the worker hot
/// path does not allocate per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry<'a> {
    /// The transaction date, as written in the file.
    pub date: &'a str,
    /// The account name.
    pub account: &'a str,
    /// The debit amount (zero when missing or malformed).
    pub debit: Decimal,
    /// The credit amount (zero when missing or malformed).
    pub credit: Decimal,
}

impl<'a> LedgerEntry<'a> {
    /// Build an entry from positional fields.
    ///
    /// Missing trailing fields are treated as empty. Amounts go through
    /// [`parse_or_default`], so this never fails.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = fields.into_iter();
        let date = fields.next().unwrap_or_default();
        let account = fields.next().unwrap_or_default();
        let _description = fields.next();
        let debit = parse_or_default(fields.next());
        let credit = parse_or_default(fields.next());

        Self {
            date,
            account,
            debit,
            credit,
        }
    }

    /// Parse a raw comma-delimited line.
    pub fn parse_line(line: &'a str) -> Self {
        Self::from_fields(line.split(','))
    }

    /// The signed movement of this entry, `debit - credit`, or `None` when
    /// the difference leaves the decimal range.
    pub fn net(&self) -> Option<Decimal> {
        self.debit.checked_sub(self.credit)
    }
}

/// Parse an amount field, falling back to zero.
///
/// This is the lenient amount policy of the engine: a missing, empty or
/// non-numeric field counts as `0` instead of failing the line. Plain decimal
/// notation and scientific notation (`1.5e3`) are accepted; surrounding
/// whitespace is ignored.
///
/// A number outside the [`Decimal`] range (magnitude above about `7.9e28`)
/// does not parse either and also counts as `0`.
pub fn parse_or_default(field: Option<&str>) -> Decimal {
    let Some(raw) = field.map(str::trim).filter(|s| !s.is_empty()) else {
        return Decimal::ZERO;
    };

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}
