//! Per-report accumulation rules.
//!
//! A [`Reducer`] is a predicate, a key function and an accumulation rule,
//! applied to every [`LedgerEntry`] inside a worker. All three reports
//! accumulate `debit - credit`; they differ in which entries count and what
//! they are keyed by.

use crate::{Aggregate, LedgerEntry, OverflowError, ReportKind, Taxonomy};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::borrow::Cow;

/// The account tracked by the yearly cash report.
pub const CASH_ACCOUNT: &str = "Cash";

/// Date layouts tried before falling back to a bare four-digit scan.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The accumulation rule of one report kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reducer {
    /// Every entry, keyed by account.
    AccountBalance,
    /// Entries of the cash account, keyed by four-digit year.
    YearlyCash,
    /// Entries whose account is in the taxonomy, keyed by account.
    ///
    /// Carries the zero-seeded accumulator so workers never consult the
    /// taxonomy itself.
    Statement {
        /// Every taxonomy account at zero.
        seed: Aggregate,
    },
}

impl Reducer {
    /// The statement reducer for a taxonomy.
    pub fn statement(taxonomy: &Taxonomy) -> Self {
        Self::Statement {
            seed: taxonomy.seed(),
        }
    }

    /// The reducer for a report kind.
    pub fn for_kind(kind: ReportKind, taxonomy: &Taxonomy) -> Self {
        match kind {
            ReportKind::Accounts => Self::AccountBalance,
            ReportKind::Yearly => Self::YearlyCash,
            ReportKind::Statement => Self::statement(taxonomy),
        }
    }

    /// The accumulator a worker starts from.
    ///
    /// Empty for the account and yearly reports; every taxonomy account at
    /// zero for the statement.
    pub fn empty(&self) -> Aggregate {
        match self {
            Self::AccountBalance | Self::YearlyCash => Aggregate::new(),
            Self::Statement { seed } => seed.clone(),
        }
    }

    /// Whether the entry takes part in this report.
    pub fn applies_to(&self, entry: &LedgerEntry<'_>) -> bool {
        match self {
            Self::AccountBalance => true,
            Self::YearlyCash => entry.account == CASH_ACCOUNT,
            Self::Statement { seed } => seed.contains(entry.account),
        }
    }

    /// The key an entry accumulates under, or `None` if it has none.
    pub fn key_of<'a>(&self, entry: &LedgerEntry<'a>) -> Option<Cow<'a, str>> {
        match self {
            Self::AccountBalance | Self::Statement { .. } => Some(Cow::Borrowed(entry.account)),
            Self::YearlyCash => extract_year(entry.date).map(Cow::Owned),
        }
    }

    /// Fold one entry into the accumulator.
    ///
    /// Fails only when the entry's net amount or a running total leaves the
    /// [`rust_decimal::Decimal`] range.
    pub fn accumulate(
        &self,
        acc: &mut Aggregate,
        entry: &LedgerEntry<'_>,
    ) -> Result<(), OverflowError> {
        if !self.applies_to(entry) {
            return Ok(());
        }
        let Some(key) = self.key_of(entry) else {
            return Ok(());
        };
        let net = entry.net().ok_or_else(|| OverflowError::new(&*key))?;
        match self {
            Self::Statement { .. } => acc.add_existing(&key, net).map(drop),
            Self::AccountBalance | Self::YearlyCash => acc.add(&key, net),
        }
    }
}

/// Derive the four-digit calendar year of a date string.
///
/// Known layouts are parsed with `chrono` and the year is taken as written,
/// with no time zone or locale adjustment. Anything else falls back to the
/// first run of exactly four ASCII digits. Returns `None` when neither
/// yields a year.
pub fn extract_year(date: &str) -> Option<String> {
    let date = date.trim();

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
                .map(|dt| dt.date())
        });

    if let Some(year) = parsed.map(|d| d.year()).filter(|y| (1000..=9999).contains(y)) {
        return Some(year.to_string());
    }

    first_four_digit_run(date).map(str::to_string)
}

fn first_four_digit_run(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let end = bytes[start..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |n| start + n);
        if end - start == 4 {
            return Some(&s[start..end]);
        }
        start = end;
    }
    None
}
