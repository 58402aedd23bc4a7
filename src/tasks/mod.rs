//! Named install steps run in a fixed order.
pub mod bin;
pub mod context;
pub mod python;
pub mod rc;

pub use context::{Context, InstallOptions};

use anyhow::Result;

use crate::logging::TaskStatus;

/// Result of a task that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task had nothing to do, with the reason.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when a
    /// program exits non-zero or a file cannot be written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The complete set of tasks run by the install command, in order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(python::CreateVirtualEnv),
        Box::new(python::InstallRequirements),
        Box::new(bin::PopulateBin),
        Box::new(rc::EditShellRc),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Returns `false` if the task failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> bool {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return true;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return false;
        }
    }
    true
}

/// Execute tasks in order, stopping after the first failure.
///
/// Later steps build on earlier ones, so nothing runs once a task fails.
/// Returns `false` if a task failed.
pub fn run_in_order<'a>(tasks: impl IntoIterator<Item = &'a dyn Task>, ctx: &Context) -> bool {
    for task in tasks {
        if !execute(task, ctx) {
            return false;
        }
    }
    true
}
