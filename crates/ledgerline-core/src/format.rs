//! Report formatting.
//!
//! Turns a merged [`Aggregate`] into the textual rows of one report. Every
//! monetary value is printed with two decimals, midpoint rounded away from
//! zero.

use crate::aggregate::checked_add;
use crate::taxonomy::group_total;
use crate::{Aggregate, GroupKind, OverflowError, ReportKind, SectionKind, Taxonomy};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// A formatted report: a header line followed by rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The report this was formatted for.
    pub kind: ReportKind,
    /// Body rows, without the header.
    pub rows: Vec<String>,
}

impl Report {
    /// Format a merged aggregate as the given report kind.
    ///
    /// The taxonomy is only consulted for [`ReportKind::Statement`], whose
    /// subtotals can overflow.
    pub fn build(
        kind: ReportKind,
        balances: &Aggregate,
        taxonomy: &Taxonomy,
    ) -> Result<Self, OverflowError> {
        let rows = match kind {
            ReportKind::Accounts => account_rows(balances),
            ReportKind::Yearly => yearly_rows(balances),
            ReportKind::Statement => statement_rows(balances, taxonomy)?,
        };
        Ok(Self { kind, rows })
    }

    /// The header line.
    pub const fn header(&self) -> &'static str {
        self.kind.header()
    }
}

/// Header and rows, each terminated by a newline.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Format a monetary value with exactly two decimals.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // Decimal keeps the sign of a negative zero.
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}

fn row(label: &str, value: Decimal) -> String {
    format!("{label},{}", format_money(value))
}

/// One `account,balance` row per key, in first-seen order.
pub fn account_rows(balances: &Aggregate) -> Vec<String> {
    balances.iter().map(|(account, v)| row(account, v)).collect()
}

/// One `year,balance` row per key, sorted by the year as a string.
///
/// String order matches numeric order only while every key has four digits,
/// which [`crate::extract_year`] guarantees.
pub fn yearly_rows(balances: &Aggregate) -> Vec<String> {
    let mut years: Vec<(&str, Decimal)> = balances.iter().collect();
    years.sort_by(|a, b| a.0.cmp(b.0));
    years.into_iter().map(|(year, v)| row(year, v)).collect()
}

/// Statement totals derived from the taxonomy's group kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementTotals {
    /// Sum of revenue accounts.
    pub revenue: Decimal,
    /// Sum of expense accounts.
    pub expenses: Decimal,
    /// Sum of asset accounts.
    pub assets: Decimal,
    /// Sum of liability accounts.
    pub liabilities: Decimal,
    /// Sum of equity accounts, before net income.
    pub equity: Decimal,
    /// Whether net income is rolled into an equity group.
    pub rolls_net_income: bool,
}

impl StatementTotals {
    /// Compute totals for a balance map.
    pub fn compute(balances: &Aggregate, taxonomy: &Taxonomy) -> Result<Self, OverflowError> {
        Ok(Self {
            revenue: taxonomy.total(GroupKind::Revenue, balances)?,
            expenses: taxonomy.total(GroupKind::Expense, balances)?,
            assets: taxonomy.total(GroupKind::Asset, balances)?,
            liabilities: taxonomy.total(GroupKind::Liability, balances)?,
            equity: taxonomy.total(GroupKind::Equity, balances)?,
            rolls_net_income: taxonomy.has_equity_group(),
        })
    }

    /// `revenue - expenses`, with balances as `debit - credit`.
    pub fn net_income(&self) -> Result<Decimal, OverflowError> {
        self.revenue
            .checked_sub(self.expenses)
            .ok_or_else(|| OverflowError::new("Net Income"))
    }

    /// Equity as shown in the balance sheet.
    ///
    /// Includes net income only when the taxonomy has an equity group to
    /// roll it into.
    pub fn total_equity(&self) -> Result<Decimal, OverflowError> {
        if self.rolls_net_income {
            checked_add("Total Equity", self.equity, self.net_income()?)
        } else {
            Ok(self.equity)
        }
    }
}

/// The financial statement rows.
///
/// Walks the taxonomy in Section → Group → account order. Net income rolls
/// into the first equity group. The closing line compares both sides of the
/// accounting equation for display only; a mismatch is not an error.
pub fn statement_rows(
    balances: &Aggregate,
    taxonomy: &Taxonomy,
) -> Result<Vec<String>, OverflowError> {
    let totals = StatementTotals::compute(balances, taxonomy)?;
    let net_income = totals.net_income()?;
    let mut out = Vec::new();
    let mut net_income_rolled = false;

    for section in taxonomy.sections() {
        out.push(String::new());
        out.push(section.title.clone());

        match section.kind {
            SectionKind::IncomeStatement => {
                for group in &section.groups {
                    push_accounts(&mut out, &group.accounts, balances);
                }
                out.push(row("Net Income", net_income));
            }
            SectionKind::BalanceSheet => {
                for group in &section.groups {
                    out.push(group.title.clone());
                    push_accounts(&mut out, &group.accounts, balances);

                    let mut subtotal = group_total(group, balances)?;
                    if group.kind == GroupKind::Equity && !net_income_rolled {
                        out.push(row("Retained Earnings (Net Income)", net_income));
                        subtotal = checked_add(&group.title, subtotal, net_income)?;
                        net_income_rolled = true;
                    }
                    out.push(row(&format!("Total {}", group.title), subtotal));
                    out.push(String::new());
                }
            }
        }
    }

    let right_side = checked_add(
        "Liabilities + Equity",
        totals.liabilities,
        totals.total_equity()?,
    )?;
    out.push(format!(
        "Assets = Liabilities + Equity, {} = {}",
        format_money(totals.assets),
        format_money(right_side)
    ));
    Ok(out)
}

fn push_accounts(out: &mut Vec<String>, accounts: &[String], balances: &Aggregate) {
    for account in accounts {
        out.push(row(account, balances.get(account).unwrap_or_default()));
    }
}
