//! Ledgerline CLI tools.
//!
//! - `ledgerline-report`: Run the account, yearly cash and financial
//!   statement reports over a directory of CSV ledgers
//!
//! # Example Usage
//!
//! ```bash
//! ledgerline-report --ledger-dir tmp --output-dir out all
//! ledgerline-report --sequential yearly
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
