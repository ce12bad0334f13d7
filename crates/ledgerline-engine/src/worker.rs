//! Worker tasks.
//!
//! A [`WorkerTask`] owns one partition of ledger files and streams them
//! record by record through a [`Reducer`], producing one partial
//! [`Aggregate`]. Tasks share nothing mutable except the [`CancelToken`].

use crate::error::TaskError;
use ledgerline_core::{Aggregate, LedgerEntry, Reducer};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cooperative cancellation flag shared by the tasks of one invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One unit of work: a partition of files and the reducer to run over them.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    partition: usize,
    files: Vec<PathBuf>,
    reducer: Arc<Reducer>,
    has_header: bool,
}

impl WorkerTask {
    /// Create a task for one partition.
    pub fn new(partition: usize, files: Vec<PathBuf>, reducer: Arc<Reducer>) -> Self {
        Self {
            partition,
            files,
            reducer,
            has_header: false,
        }
    }

    /// Skip the first line of every file.
    #[must_use]
    pub const fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Index of the partition this task owns.
    pub const fn partition(&self) -> usize {
        self.partition
    }

    /// Files assigned to this task.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Stream every assigned file and return the partial aggregate.
    ///
    /// Starts from the reducer's empty accumulator, so a task with no files
    /// returns it unchanged. Stops with [`TaskError::Cancelled`] once the
    /// token is tripped.
    pub fn run(&self, cancel: &CancelToken) -> Result<Aggregate, TaskError> {
        let mut acc = self.reducer.empty();
        for path in &self.files {
            self.stream_file(path, &mut acc, cancel)?;
        }
        Ok(acc)
    }

    fn stream_file(
        &self,
        path: &Path,
        acc: &mut Aggregate,
        cancel: &CancelToken,
    ) -> Result<(), TaskError> {
        debug!(partition = self.partition, file = %path.display(), "streaming ledger file");

        let file = File::open(path).map_err(|source| TaskError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // No quoting: a comma always separates fields.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .quoting(false)
            .flexible(true)
            .from_reader(file);

        let mut record = csv::StringRecord::new();
        let mut lines = 0usize;
        loop {
            if cancel.is_cancelled() {
                return Err(TaskError::Cancelled);
            }
            let more = reader
                .read_record(&mut record)
                .map_err(|source| TaskError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if !more {
                break;
            }
            let entry = LedgerEntry::from_fields(record.iter());
            self.reducer
                .accumulate(acc, &entry)
                .map_err(|source| TaskError::Overflow {
                    path: path.to_path_buf(),
                    source,
                })?;
            lines += 1;
        }

        debug!(partition = self.partition, file = %path.display(), lines, "finished ledger file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_core::Taxonomy;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn ledger(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_accumulates_across_files() {
        let dir = TempDir::new().unwrap();
        let a = ledger(&dir, "a.csv", "2023-01-01,Cash,,100,0\n2023-01-02,Inventory,,5,0\n");
        let b = ledger(&dir, "b.csv", "2023-06-01,Cash,,0,40\n");

        let task = WorkerTask::new(0, vec![a, b], Arc::new(Reducer::AccountBalance));
        let acc = task.run(&CancelToken::new()).unwrap();

        assert_eq!(acc.get("Cash"), Some(dec!(60)));
        assert_eq!(acc.get("Inventory"), Some(dec!(5)));
        assert_eq!(acc.keys().collect::<Vec<_>>(), vec!["Cash", "Inventory"]);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let dir = TempDir::new().unwrap();
        let a = ledger(&dir, "a.csv", "2023-01-01,Cash,,100,0\r\n\r\n2023-01-02,Cash,,,50\r\n");

        let task = WorkerTask::new(0, vec![a], Arc::new(Reducer::AccountBalance));
        let acc = task.run(&CancelToken::new()).unwrap();
        assert_eq!(acc.get("Cash"), Some(dec!(50)));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_header_skipped_when_configured() {
        let dir = TempDir::new().unwrap();
        let a = ledger(&dir, "a.csv", "date,account,memo,debit,credit\n2023-01-01,Cash,,7,0\n");

        let task = WorkerTask::new(0, vec![a], Arc::new(Reducer::AccountBalance)).with_header(true);
        let acc = task.run(&CancelToken::new()).unwrap();
        assert_eq!(acc.keys().collect::<Vec<_>>(), vec!["Cash"]);
    }

    #[test]
    fn test_empty_task_returns_seed() {
        let reducer = Arc::new(Reducer::statement(&Taxonomy::standard()));
        let acc = WorkerTask::new(0, Vec::new(), reducer)
            .run(&CancelToken::new())
            .unwrap();
        assert_eq!(acc.len(), 20);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let task = WorkerTask::new(
            3,
            vec![dir.path().join("gone.csv")],
            Arc::new(Reducer::AccountBalance),
        );
        let err = task.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, TaskError::Open { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"2023-01-01,Ca\xffsh,,1,0\n").unwrap();

        let task = WorkerTask::new(0, vec![path], Arc::new(Reducer::AccountBalance));
        let err = task.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, TaskError::Read { .. }));
    }

    #[test]
    fn test_overflowing_total_is_overflow_error() {
        let dir = TempDir::new().unwrap();
        let path = ledger(
            &dir,
            "big.csv",
            "2023-01-01,Cash,,70000000000000000000000000000,0\n\
             2023-01-02,Cash,,70000000000000000000000000000,0\n",
        );

        let task = WorkerTask::new(0, vec![path.clone()], Arc::new(Reducer::AccountBalance));
        let err = task.run(&CancelToken::new()).unwrap_err();
        match err {
            TaskError::Overflow { path: failed, source } => {
                assert_eq!(failed, path);
                assert_eq!(source.key, "Cash");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cancelled_token_stops_task() {
        let dir = TempDir::new().unwrap();
        let a = ledger(&dir, "a.csv", "2023-01-01,Cash,,100,0\n");

        let cancel = CancelToken::new();
        cancel.cancel();
        let task = WorkerTask::new(0, vec![a], Arc::new(Reducer::AccountBalance));
        assert!(matches!(task.run(&cancel), Err(TaskError::Cancelled)));
    }
}
