//! The report engine: scan, partition, execute, merge, format, write.

use crate::config::EngineConfig;
use crate::error::{EngineError, TaskError};
use crate::pool::{run_guarded, WorkerPool};
use crate::scan::{partition, scan_ledger_dir};
use crate::status::{ReportState, StatusTracker};
use crate::worker::{CancelToken, WorkerTask};
use crate::writer::write_report;
use ledgerline_core::{merge_into, Aggregate, Reducer, Report, ReportKind, Taxonomy};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span};

/// How a report is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// All files streamed by one task on the calling thread.
    Sequential,
    /// Files partitioned across the worker pool.
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        })
    }
}

/// The result of one successful report invocation.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// The report produced.
    pub kind: ReportKind,
    /// How it was executed.
    pub mode: ExecutionMode,
    /// Where the report was written.
    pub path: PathBuf,
    /// Number of ledger files read.
    pub files: usize,
    /// Number of worker tasks run.
    pub partitions: usize,
    /// Number of rows written below the header.
    pub rows: usize,
    /// Wall-clock time from start to written output.
    pub elapsed: Duration,
    /// The merged aggregate the report was formatted from.
    pub aggregate: Aggregate,
}

/// Ledger report engine.
///
/// Holds the configuration, the injected taxonomy, the worker pool and the
/// status of each report kind. All operations take `&self`, so the status can
/// be queried from another thread while a report is running.
#[derive(Debug)]
pub struct ReportEngine {
    config: EngineConfig,
    taxonomy: Arc<Taxonomy>,
    pool: WorkerPool,
    status: StatusTracker,
}

impl ReportEngine {
    /// Create an engine, loading the taxonomy named in the configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let taxonomy = config.load_taxonomy()?;
        Self::with_taxonomy(config, taxonomy)
    }

    /// Create an engine with an explicit taxonomy.
    pub fn with_taxonomy(config: EngineConfig, taxonomy: Taxonomy) -> Result<Self, EngineError> {
        let pool =
            WorkerPool::new(config.workers)?.with_cancel_on_failure(config.cancel_on_failure);
        Ok(Self {
            config,
            taxonomy: Arc::new(taxonomy),
            pool,
            status: StatusTracker::new(),
        })
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The statement taxonomy.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Account balances, single-threaded.
    pub fn accounts(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Accounts, ExecutionMode::Sequential)
    }

    /// Account balances, on the worker pool.
    pub fn accounts_parallel(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Accounts, ExecutionMode::Parallel)
    }

    /// Yearly cash, single-threaded.
    pub fn yearly(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Yearly, ExecutionMode::Sequential)
    }

    /// Yearly cash, on the worker pool.
    pub fn yearly_parallel(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Yearly, ExecutionMode::Parallel)
    }

    /// Financial statement, single-threaded.
    pub fn statement(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Statement, ExecutionMode::Sequential)
    }

    /// Financial statement, on the worker pool.
    pub fn statement_parallel(&self) -> Result<ReportOutcome, EngineError> {
        self.run(ReportKind::Statement, ExecutionMode::Parallel)
    }

    /// Structured state of a report kind.
    pub fn state(&self, kind: ReportKind) -> ReportState {
        self.status.get(kind)
    }

    /// Rendered state of a report kind, e.g. `finished in 0.42`.
    pub fn status(&self, kind: ReportKind) -> String {
        self.status.render(kind)
    }

    /// Produce one report.
    ///
    /// The status moves to `starting` before any file is touched and to
    /// `finished` only once the report is on disk. Any error moves it to
    /// `failed` and leaves no report file behind.
    pub fn run(&self, kind: ReportKind, mode: ExecutionMode) -> Result<ReportOutcome, EngineError> {
        let _span = info_span!("report", kind = %kind, mode = %mode).entered();
        self.status.start(kind);
        let start = Instant::now();

        match self.execute(kind, mode, start) {
            Ok(outcome) => {
                self.status.finish(kind, outcome.elapsed);
                info!(
                    files = outcome.files,
                    partitions = outcome.partitions,
                    rows = outcome.rows,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    path = %outcome.path.display(),
                    "report written"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "report failed");
                self.status.fail(kind, err.to_string());
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        kind: ReportKind,
        mode: ExecutionMode,
        start: Instant,
    ) -> Result<ReportOutcome, EngineError> {
        let files = scan_ledger_dir(
            &self.config.ledger_dir,
            &self.config.extension,
            kind.output_file(),
        )?;
        info!(files = files.len(), dir = %self.config.ledger_dir.display(), "scanned ledger directory");

        let reducer = Arc::new(Reducer::for_kind(kind, &self.taxonomy));
        let file_count = files.len();

        let (partials, partitions) = match mode {
            ExecutionMode::Sequential => {
                let task = self.task(0, files, &reducer);
                let partial = run_guarded(&task, &CancelToken::new())
                    .map_err(|source: TaskError| EngineError::Task {
                        partition: 0,
                        source,
                    })?;
                (vec![partial], 1)
            }
            ExecutionMode::Parallel => {
                let tasks: Vec<WorkerTask> = partition(&files, self.config.workers)
                    .into_iter()
                    .enumerate()
                    .map(|(i, group)| self.task(i, group, &reducer))
                    .collect();
                let partitions = tasks.len();
                (self.pool.execute(tasks)?, partitions)
            }
        };

        let aggregate = merge_into(reducer.empty(), partials)?;
        let report = Report::build(kind, &aggregate, &self.taxonomy)?;
        let path = write_report(&self.config.output_dir, &report)?;

        Ok(ReportOutcome {
            kind,
            mode,
            path,
            files: file_count,
            partitions,
            rows: report.rows.len(),
            elapsed: start.elapsed(),
            aggregate,
        })
    }

    fn task(&self, index: usize, files: Vec<PathBuf>, reducer: &Arc<Reducer>) -> WorkerTask {
        WorkerTask::new(index, files, Arc::clone(reducer)).with_header(self.config.has_header)
    }
}
