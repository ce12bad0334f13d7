//! Engine error types.

use ledgerline_core::{OverflowError, TaxonomyError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a report invocation.
///
/// None of these are retried. When one is returned no report file has been
/// written for the invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Listing the ledger directory failed. Raised before any task starts.
    #[error("failed to read ledger directory {path}: {source}")]
    DirectoryRead {
        /// The directory that failed to list.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A worker task failed.
    #[error("worker for partition {partition} failed: {source}")]
    Task {
        /// Index of the failed partition.
        partition: usize,
        /// What went wrong in the task.
        #[source]
        source: TaskError,
    },

    /// Merging the partials or totalling the statement overflowed.
    #[error("report total overflowed: {0}")]
    Overflow(#[from] OverflowError),

    /// Persisting the report failed. No partial file is kept.
    #[error("failed to write report {path}: {source}")]
    Write {
        /// The report path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised inside one worker task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A ledger file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// The ledger file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A ledger file could not be read (IO error or invalid UTF-8).
    #[error("failed to read {path}: {source}")]
    Read {
        /// The ledger file.
        path: PathBuf,
        /// The underlying CSV reader error.
        #[source]
        source: csv::Error,
    },

    /// A running total left the decimal range.
    #[error("failed to total {path}: {source}")]
    Overflow {
        /// The ledger file being streamed.
        path: PathBuf,
        /// The key whose total overflowed.
        #[source]
        source: OverflowError,
    },

    /// The task stopped because a sibling task failed.
    #[error("cancelled after a sibling task failed")]
    Cancelled,

    /// The task panicked.
    #[error("worker panicked: {0}")]
    Panicked(String),

    /// The task ended without reporting a result.
    #[error("worker exited without reporting a result")]
    Disconnected,
}

/// Errors loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration or taxonomy file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::EngineConfig`].
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The taxonomy file is invalid.
    #[error("invalid taxonomy in {path}: {source}")]
    Taxonomy {
        /// The taxonomy file.
        path: PathBuf,
        /// The taxonomy error.
        #[source]
        source: TaxonomyError,
    },
}

impl EngineError {
    /// Whether this error is a sibling cancellation rather than a root cause.
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Task {
                source: TaskError::Cancelled,
                ..
            }
        )
    }
}
