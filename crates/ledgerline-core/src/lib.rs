//! Core types for ledgerline
//!
//! This crate provides the pure, I/O-free building blocks of the report engine:
//!
//! - [`LedgerEntry`] - One positional `date,account,<unused>,debit,credit` line
//! - [`Aggregate`] - An insertion-ordered map from report key to running total
//! - [`Taxonomy`] - The Section → Group → account structure of the financial statement
//! - [`Reducer`] - The accumulation rule of one report kind
//! - [`merge`] - Associative, commutative combination of partial aggregates
//! - [`format`] - Rendering of merged aggregates into report rows
//!
//! # Example
//!
//! ```
//! use ledgerline_core::{merge, LedgerEntry, Reducer};
//! use rust_decimal_macros::dec;
//!
//! let reducer = Reducer::YearlyCash;
//!
//! let mut first = reducer.empty();
//! reducer.accumulate(&mut first, &LedgerEntry::parse_line("2023-01-01,Cash,,100,0"))?;
//!
//! let mut second = reducer.empty();
//! reducer.accumulate(&mut second, &LedgerEntry::parse_line("2023-06-01,Cash,,0,40"))?;
//!
//! let merged = merge([first, second])?;
//! assert_eq!(merged.get("2023"), Some(dec!(60)));
//! # Ok::<(), ledgerline_core::OverflowError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod entry;
pub mod format;
pub mod kind;
pub mod reducer;
pub mod taxonomy;

pub use aggregate::{checked_add, merge, merge_into, Aggregate, OverflowError};
pub use entry::{parse_or_default, LedgerEntry};
pub use format::{format_money, Report};
pub use kind::ReportKind;
pub use reducer::{extract_year, Reducer, CASH_ACCOUNT};
pub use taxonomy::{Group, GroupKind, Section, SectionKind, Taxonomy, TaxonomyError};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
