//! Task summary records and the [`Log`] trait.

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Task name as shown in the stage header.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or error chain, if any.
    pub message: Option<String>,
}

/// How an install task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task made its changes.
    Ok,
    /// The task did not apply to this run, e.g. `--no-editrc`.
    NotApplicable,
    /// The task ran but had nothing to do.
    Skipped,
    /// The task only reported what it would change.
    DryRun,
    /// The task returned an error.
    Failed,
}

impl TaskStatus {
    /// Summary marker.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "·",
            Self::Skipped => "○",
            Self::DryRun => "~",
            Self::Failed => "✗",
        }
    }

    /// SGR color used for the summary line.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped => "\x1b[33m",
            Self::DryRun => "\x1b[37m",
            Self::Failed => "\x1b[31m",
        }
    }

    /// Word used in the summary totals.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Every status, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::NotApplicable,
        Self::Skipped,
        Self::DryRun,
        Self::Failed,
    ];
}

/// Sink for user-facing diagnostics.
///
/// [`Logger`](super::logger::Logger) is the production implementation. The
/// install engine, tasks and the trash driver log through this trait so
/// tests can capture what they report.
pub trait Log: Send + Sync {
    /// Log a stage header.
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message, shown on the console only with `--verbose`.
    fn debug(&self, msg: &str);
    /// Log a warning.
    fn warn(&self, msg: &str);
    /// Log an error.
    fn error(&self, msg: &str);
    /// Log a change that a dry run skipped.
    fn dry_run(&self, msg: &str);
    /// Record how a task ended, for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_distinct_symbol_and_label() {
        let symbols: std::collections::HashSet<_> =
            TaskStatus::ALL.iter().map(|s| s.symbol()).collect();
        let labels: std::collections::HashSet<_> =
            TaskStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(symbols.len(), TaskStatus::ALL.len());
        assert_eq!(labels.len(), TaskStatus::ALL.len());
    }

    #[test]
    fn failed_is_red() {
        assert_eq!(TaskStatus::Failed.color(), "\x1b[31m");
        assert_eq!(TaskStatus::NotApplicable.label(), "n/a");
    }
}
