//! [`Logger`]: tracing-backed [`Log`] with a per-run task summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;
use super::{DRY_RUN_TARGET, STAGE_TARGET};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// `record_task` is not included because its signature differs.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Console and file logger for one `shelpers` invocation.
///
/// Messages become [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them to
/// the terminal and to `$XDG_CACHE_HOME/shelpers/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// Only remembers where the log file lives, for the summary.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    fn entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a change that a dry run skipped.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record how a task ended.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded task has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Number of failed tasks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }

    /// Log one line per recorded task, the totals and the log file path.
    pub fn print_summary(&self) {
        let tasks = self.entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        for task in &tasks {
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!(
                "{}{} {}{suffix}\x1b[0m",
                task.status.color(),
                task.status.symbol(),
                task.name
            ));
        }

        let totals: Vec<String> = TaskStatus::ALL
            .iter()
            .map(|&status| {
                let count = tasks.iter().filter(|t| t.status == status).count();
                format!("{}{count} {}\x1b[0m", status.color(), status.label())
            })
            .collect();
        self.info(&format!("{} tasks: {}", tasks.len(), totals.join(", ")));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn log_text(log: &Logger) -> String {
        fs::read_to_string(log.log_path().expect("log path")).unwrap()
    }

    #[test]
    fn record_task_keeps_message() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.entries().is_empty());
        log.record_task("Edit shell profile", TaskStatus::Skipped, Some("declined"));
        let tasks = log.entries();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Edit shell profile");
        assert_eq!(tasks[0].message.as_deref(), Some("declined"));
    }

    #[test]
    fn failure_count_ignores_other_statuses() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("Create virtual environment", TaskStatus::Ok, None);
        assert!(!log.has_failures());
        log.record_task("Install requirements", TaskStatus::Failed, Some("pip"));
        log.record_task("Populate bin directory", TaskStatus::DryRun, None);
        log.record_task("Edit shell profile", TaskStatus::Failed, Some("io"));
        assert_eq!(log.failure_count(), 2);
        assert!(log.has_failures());
    }

    #[test]
    fn events_reach_log_file_with_tags() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Populate bin directory");
        log.warn("skipping if-bundle org.videolan.vlc");
        log.dry_run("would write bin/imgcat");
        log.debug("root: /Users/me/shelpers");
        let text = log_text(&log);
        assert!(text.contains("==> Populate bin directory"));
        assert!(text.contains("[warn] skipping if-bundle org.videolan.vlc"));
        assert!(text.contains("[dry run] would write bin/imgcat"));
        assert!(text.contains("[debug] root: /Users/me/shelpers"));
    }

    #[test]
    fn summary_lists_tasks_without_ansi_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("Populate bin directory", TaskStatus::Ok, None);
        log.record_task("Edit shell profile", TaskStatus::NotApplicable, None);
        log.print_summary();
        let text = log_text(&log);
        assert!(text.contains("==> Summary"));
        assert!(text.contains("✓ Populate bin directory"));
        assert!(text.contains("2 tasks: 1 ok, 1 n/a, 0 skipped, 0 dry-run, 0 failed"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn empty_summary_logs_nothing() {
        let (log, _tmp, _guard) = isolated_logger();
        log.print_summary();
        assert!(!log_text(&log).contains("Summary"));
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_task("via-trait", TaskStatus::Ok, None);
        assert_eq!(log.entries().len(), 1);
    }
}
