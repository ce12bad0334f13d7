//! Report persistence.

use crate::error::EngineError;
use ledgerline_core::Report;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write a report into `dir` under its kind's file name.
///
/// The report is written to a temporary file in the same directory and
/// renamed into place, so a failed write never leaves a partial report
/// behind and an existing report is replaced atomically. Creates `dir` if
/// it does not exist.
pub fn write_report(dir: &Path, report: &Report) -> Result<PathBuf, EngineError> {
    let path = dir.join(report.kind.output_file());
    let write_error = |source| EngineError::Write {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_error)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write!(out, "{report}").map_err(write_error)?;
        out.flush().map_err(write_error)?;
    }
    tmp.persist(&path).map_err(|e| write_error(e.error))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_core::{Aggregate, ReportKind, Taxonomy};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_dir_and_replaces() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let taxonomy = Taxonomy::standard();

        let mut balances = Aggregate::new();
        balances.add("Cash", dec!(1)).unwrap();
        let first = Report::build(ReportKind::Accounts, &balances, &taxonomy).unwrap();
        let path = write_report(&out, &first).unwrap();
        assert_eq!(path, out.join("accounts.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Account,Balance\nCash,1.00\n");

        let second = Report::build(ReportKind::Accounts, &Aggregate::new(), &taxonomy).unwrap();
        write_report(&out, &second).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Account,Balance\n");

        // Only the report itself remains, no temporary files.
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let report = Report::build(ReportKind::Yearly, &Aggregate::new(), &Taxonomy::standard())
            .unwrap();
        let err = write_report(&blocker, &report).unwrap_err();
        assert!(matches!(err, EngineError::Write { .. }));
    }
}
