//! Financial statement taxonomy.
//!
//! The taxonomy is the fixed key universe of the financial statement:
//! sections contain groups, groups contain an ordered list of canonical
//! account names. It is an immutable value handed to the engine at
//! construction, either [`Taxonomy::standard`] or one loaded from JSON.

use crate::aggregate::checked_add;
use crate::{Aggregate, OverflowError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors building a taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// The same account is listed twice.
    #[error("account {0:?} appears more than once in the taxonomy")]
    DuplicateAccount(String),

    /// The JSON document could not be parsed.
    #[error("invalid taxonomy: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a section is laid out in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Accounts listed flat, followed by net income.
    IncomeStatement,
    /// Accounts listed per group, each group with a total.
    BalanceSheet,
}

/// The role of a group when computing statement totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Revenue accounts.
    Revenue,
    /// Expense accounts.
    Expense,
    /// Asset accounts.
    Asset,
    /// Liability accounts.
    Liability,
    /// Equity accounts.
    Equity,
}

/// A named group of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Display title, e.g. `Assets`.
    pub title: String,
    /// Role in the totals.
    pub kind: GroupKind,
    /// Canonical account names, in display order.
    pub accounts: Vec<String>,
}

/// A statement section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Display title, e.g. `Balance Sheet`.
    pub title: String,
    /// Layout of the section.
    pub kind: SectionKind,
    /// Groups, in display order.
    pub groups: Vec<Group>,
}

/// The Section → Group → account structure of the financial statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    sections: Vec<Section>,
}

impl Taxonomy {
    /// Build a taxonomy, rejecting duplicate accounts.
    pub fn new(sections: Vec<Section>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        for section in &sections {
            for group in &section.groups {
                for account in &group.accounts {
                    if !seen.insert(account.as_str()) {
                        return Err(TaxonomyError::DuplicateAccount(account.clone()));
                    }
                }
            }
        }
        Ok(Self { sections })
    }

    /// Parse a taxonomy from a JSON array of sections.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let sections: Vec<Section> = serde_json::from_str(json)?;
        Self::new(sections)
    }

    /// The standard small-business chart of accounts.
    pub fn standard() -> Self {
        fn group(title: &str, kind: GroupKind, accounts: &[&str]) -> Group {
            Group {
                title: title.to_string(),
                kind,
                accounts: accounts.iter().map(|a| (*a).to_string()).collect(),
            }
        }

        Self {
            sections: vec![
                Section {
                    title: "Income Statement".to_string(),
                    kind: SectionKind::IncomeStatement,
                    groups: vec![
                        group("Revenues", GroupKind::Revenue, &["Sales Revenue"]),
                        group(
                            "Expenses",
                            GroupKind::Expense,
                            &[
                                "Cost of Goods Sold",
                                "Salaries Expense",
                                "Rent Expense",
                                "Utilities Expense",
                                "Interest Expense",
                                "Tax Expense",
                            ],
                        ),
                    ],
                },
                Section {
                    title: "Balance Sheet".to_string(),
                    kind: SectionKind::BalanceSheet,
                    groups: vec![
                        group(
                            "Assets",
                            GroupKind::Asset,
                            &[
                                "Cash",
                                "Accounts Receivable",
                                "Inventory",
                                "Fixed Assets",
                                "Prepaid Expenses",
                            ],
                        ),
                        group(
                            "Liabilities",
                            GroupKind::Liability,
                            &[
                                "Accounts Payable",
                                "Loan Payable",
                                "Sales Tax Payable",
                                "Accrued Liabilities",
                                "Unearned Revenue",
                                "Dividends Payable",
                            ],
                        ),
                        group(
                            "Equity",
                            GroupKind::Equity,
                            &["Common Stock", "Retained Earnings"],
                        ),
                    ],
                },
            ],
        }
    }

    /// Sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All accounts in Section → Group → account order.
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| &s.groups)
            .flat_map(|g| &g.accounts)
            .map(String::as_str)
    }

    /// Whether the account belongs to the taxonomy.
    pub fn contains(&self, account: &str) -> bool {
        self.accounts().any(|a| a == account)
    }

    /// A zero-filled aggregate over exactly the taxonomy's accounts.
    pub fn seed(&self) -> Aggregate {
        Aggregate::zeroed(self.accounts())
    }

    /// Sum of all accounts in groups of the given kind.
    pub fn total(&self, kind: GroupKind, balances: &Aggregate) -> Result<Decimal, OverflowError> {
        self.sections
            .iter()
            .flat_map(|s| &s.groups)
            .filter(|g| g.kind == kind)
            .try_fold(Decimal::ZERO, |sum, g| {
                checked_add(&g.title, sum, group_total(g, balances)?)
            })
    }

    /// Whether any balance sheet group has the equity kind.
    pub fn has_equity_group(&self) -> bool {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::BalanceSheet)
            .flat_map(|s| &s.groups)
            .any(|g| g.kind == GroupKind::Equity)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sum of one group's accounts; missing accounts count as zero.
pub(crate) fn group_total(group: &Group, balances: &Aggregate) -> Result<Decimal, OverflowError> {
    group.accounts.iter().try_fold(Decimal::ZERO, |sum, account| {
        checked_add(&group.title, sum, balances.get(account).unwrap_or_default())
    })
}
