//! Parallel report engine for flat-file ledgers.
//!
//! This crate turns a directory of CSV ledger files into report files. Each
//! invocation scans the directory, splits the files into contiguous
//! partitions, streams every partition through a reducer on a worker pool,
//! merges the partial aggregates and writes the formatted report.
//!
//! # Features
//!
//! - Account balance, yearly cash and financial statement reports
//! - Sequential and parallel forms of every report with identical output
//! - Cooperative cancellation of sibling tasks after a failure
//! - Atomic report writes
//! - Per-report status (`idle`, `starting`, `finished in X`, `failed: ...`)
//!
//! # Example
//!
//! ```no_run
//! use ledgerline_engine::{EngineConfig, ReportEngine};
//! use ledgerline_core::ReportKind;
//!
//! let config = EngineConfig::default()
//!     .with_ledger_dir("data/ledgers")
//!     .with_output_dir("data/reports");
//! let engine = ReportEngine::new(config)?;
//!
//! let outcome = engine.yearly_parallel()?;
//! println!("wrote {}", outcome.path.display());
//! println!("yearly: {}", engine.status(ReportKind::Yearly));
//! # Ok::<(), ledgerline_engine::EngineError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod pool;
mod scan;
mod status;
mod worker;
mod writer;

pub use config::{EngineConfig, DEFAULT_WORKERS};
pub use engine::{ExecutionMode, ReportEngine, ReportOutcome};
pub use error::{ConfigError, EngineError, TaskError};
pub use pool::WorkerPool;
pub use scan::{partition, scan_ledger_dir};
pub use status::{ReportState, StatusTracker};
pub use worker::{CancelToken, WorkerTask};
pub use writer::write_report;
