//! The three report kinds.

use std::fmt;
use std::str::FromStr;

/// A report the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    /// Per-account trial balance.
    Accounts,
    /// Net cash movement per calendar year.
    Yearly,
    /// Categorized financial statement.
    Statement,
}

impl ReportKind {
    /// All report kinds, in the order they are usually run.
    pub const ALL: [Self; 3] = [Self::Accounts, Self::Yearly, Self::Statement];

    /// Short name used for status lookups and logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Yearly => "yearly",
            Self::Statement => "fs",
        }
    }

    /// File name of the persisted report.
    ///
    /// The scanner also skips this name when it shows up in the ledger
    /// directory, so a previous output never feeds back into the input.
    pub const fn output_file(self) -> &'static str {
        match self {
            Self::Accounts => "accounts.csv",
            Self::Yearly => "yearly.csv",
            Self::Statement => "fs.csv",
        }
    }

    /// First line of the persisted report.
    pub const fn header(self) -> &'static str {
        match self {
            Self::Accounts => "Account,Balance",
            Self::Yearly => "Financial Year,Cash Balance",
            Self::Statement => "Basic Financial Statement",
        }
    }

    /// Position of this kind in [`ReportKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Accounts => 0,
            Self::Yearly => 1,
            Self::Statement => 2,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounts" => Ok(Self::Accounts),
            "yearly" => Ok(Self::Yearly),
            "fs" | "statement" => Ok(Self::Statement),
            other => Err(format!("unknown report kind: {other}")),
        }
    }
}
