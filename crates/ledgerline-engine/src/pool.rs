//! Fixed-size worker pool.
//!
//! Tasks run on a dedicated rayon pool and report back over a channel as
//! `(partition, result)` messages. The coordinator waits for one message per
//! task before returning, so no task outlives the invocation that spawned it.

use crate::error::{EngineError, TaskError};
use crate::worker::{CancelToken, WorkerTask};
use crossbeam_channel::unbounded;
use ledgerline_core::Aggregate;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Runs worker tasks in parallel and collects their partial aggregates.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    cancel_on_failure: bool,
}

impl WorkerPool {
    /// Create a pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("ledgerline-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            cancel_on_failure: true,
        })
    }

    /// Choose whether the first failure cancels the remaining tasks.
    #[must_use]
    pub const fn with_cancel_on_failure(mut self, cancel: bool) -> Self {
        self.cancel_on_failure = cancel;
        self
    }

    /// Number of threads in the pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every task and return the partials ordered by partition index.
    ///
    /// Waits for all tasks even after a failure. The error returned is the
    /// failure with the lowest partition index; cancellations it caused in
    /// sibling tasks are not reported.
    pub fn execute(&self, tasks: Vec<WorkerTask>) -> Result<Vec<Aggregate>, EngineError> {
        let results = self.run_all(tasks);

        if let Some(partition) = results
            .iter()
            .position(|r| matches!(r, Err(e) if !matches!(e, TaskError::Cancelled)))
        {
            let source = results
                .into_iter()
                .nth(partition)
                .and_then(Result::err)
                .unwrap_or(TaskError::Disconnected);
            return Err(EngineError::Task { partition, source });
        }

        results
            .into_iter()
            .enumerate()
            .map(|(partition, result)| {
                result.map_err(|source| EngineError::Task { partition, source })
            })
            .collect()
    }

    /// Run every task and return each task's own result, ordered by
    /// partition index.
    ///
    /// Returns only after every task has reported. With cancellation on, the
    /// first failure trips the shared token and the tasks still streaming
    /// end with [`TaskError::Cancelled`].
    pub fn run_all(&self, tasks: Vec<WorkerTask>) -> Vec<Result<Aggregate, TaskError>> {
        let count = tasks.len();
        let (tx, rx) = unbounded::<(usize, Result<Aggregate, TaskError>)>();
        let cancel = CancelToken::new();

        for (slot, task) in tasks.into_iter().enumerate() {
            let tx = tx.clone();
            let cancel = cancel.clone();
            debug!(
                partition = task.partition(),
                files = task.files().len(),
                "dispatching worker"
            );
            self.pool.spawn(move || {
                let result = run_guarded(&task, &cancel);
                // The receiver lives until every slot has reported.
                let _ = tx.send((slot, result));
            });
        }
        drop(tx);

        let mut results: Vec<Option<Result<Aggregate, TaskError>>> =
            (0..count).map(|_| None).collect();

        for _ in 0..count {
            let Ok((slot, result)) = rx.recv() else {
                break;
            };
            match &result {
                Ok(_) => {}
                Err(TaskError::Cancelled) => {
                    debug!(partition = slot, "worker cancelled");
                }
                Err(source) => {
                    warn!(partition = slot, error = %source, "worker failed");
                    if self.cancel_on_failure && !cancel.is_cancelled() {
                        warn!("cancelling remaining workers");
                        cancel.cancel();
                    }
                }
            }
            results[slot] = Some(result);
        }

        results
            .into_iter()
            .map(|result| result.unwrap_or(Err(TaskError::Disconnected)))
            .collect()
    }
}

/// Run one task, turning a panic into [`TaskError::Panicked`].
pub(crate) fn run_guarded(task: &WorkerTask, cancel: &CancelToken) -> Result<Aggregate, TaskError> {
    panic::catch_unwind(AssertUnwindSafe(|| task.run(cancel)))
        .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
