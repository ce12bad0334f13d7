//! Per-report status tracking.
//!
//! State is tracked as a structured [`ReportState`] and rendered to text
//! only when asked. The rendered `finished in {seconds}` shape is what
//! external timing collectors match on, so it must stay stable.

use ledgerline_core::ReportKind;
use parking_lot::RwLock;
use std::fmt;
use std::time::Duration;

/// The state of one report kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportState {
    /// Never run.
    #[default]
    Idle,
    /// Running; no output written yet.
    Starting,
    /// Output fully written.
    Finished {
        /// Wall-clock time of the invocation.
        elapsed: Duration,
    },
    /// The last invocation failed; no output was written.
    Failed {
        /// Display form of the error.
        reason: String,
    },
}

impl ReportState {
    /// Elapsed seconds of a finished report.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match self {
            Self::Finished { elapsed } => Some(elapsed.as_secs_f64()),
            _ => None,
        }
    }

    /// Whether a report is currently running.
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Starting)
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Starting => f.write_str("starting"),
            Self::Finished { elapsed } => write!(f, "finished in {:.2}", elapsed.as_secs_f64()),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Shared, per-kind report states.
#[derive(Debug, Default)]
pub struct StatusTracker {
    states: RwLock<[ReportState; 3]>,
}

impl StatusTracker {
    /// Create a tracker with every report idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a report.
    pub fn get(&self, kind: ReportKind) -> ReportState {
        self.states.read()[kind.index()].clone()
    }

    /// Current state of a report, rendered.
    pub fn render(&self, kind: ReportKind) -> String {
        self.states.read()[kind.index()].to_string()
    }

    /// Mark a report as started.
    pub fn start(&self, kind: ReportKind) {
        self.set(kind, ReportState::Starting);
    }

    /// Mark a report as finished.
    pub fn finish(&self, kind: ReportKind, elapsed: Duration) {
        self.set(kind, ReportState::Finished { elapsed });
    }

    /// Mark a report as failed.
    pub fn fail(&self, kind: ReportKind, reason: impl Into<String>) {
        self.set(
            kind,
            ReportState::Failed {
                reason: reason.into(),
            },
        );
    }

    fn set(&self, kind: ReportKind, state: ReportState) {
        self.states.write()[kind.index()] = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let tracker = StatusTracker::new();
        assert_eq!(tracker.render(ReportKind::Accounts), "idle");

        tracker.start(ReportKind::Accounts);
        assert!(tracker.get(ReportKind::Accounts).is_running());
        assert_eq!(tracker.render(ReportKind::Accounts), "starting");
        assert_eq!(tracker.render(ReportKind::Yearly), "idle");

        tracker.finish(ReportKind::Accounts, Duration::from_millis(1234));
        assert_eq!(tracker.render(ReportKind::Accounts), "finished in 1.23");
        let seconds = tracker
            .get(ReportKind::Accounts)
            .elapsed_seconds()
            .unwrap();
        assert!((seconds - 1.234).abs() < 1e-9);
    }

    #[test]
    fn test_failed_state() {
        let tracker = StatusTracker::new();
        tracker.start(ReportKind::Statement);
        tracker.fail(ReportKind::Statement, "disk full");
        assert_eq!(tracker.render(ReportKind::Statement), "failed: disk full");
        assert_eq!(tracker.get(ReportKind::Statement).elapsed_seconds(), None);
    }

    #[test]
    fn test_finished_shape_is_parseable() {
        let rendered = ReportState::Finished {
            elapsed: Duration::from_secs(3),
        }
        .to_string();
        let seconds: f64 = rendered
            .strip_prefix("finished in ")
            .and_then(|s| s.parse().ok())
            .unwrap();
        assert!((seconds - 3.0).abs() < f64::EPSILON);
    }
}
