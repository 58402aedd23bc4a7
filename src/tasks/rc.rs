//! Task: shell startup file edit.
use anyhow::{Context as _, Result};
use std::io::{self, Write as _};
use std::path::PathBuf;

use super::{Context, Task, TaskResult};
use crate::install::rc::{self, EditPolicy, RcOutcome};

/// Put `bin/` on `PATH` in the user's shell startup file.
#[derive(Debug)]
pub struct EditShellRc;

impl EditShellRc {
    /// Startup file to edit, or the reason there is none.
    fn target(ctx: &Context) -> Result<PathBuf, String> {
        if let Some(path) = &ctx.options.rcfile {
            return Ok(path.clone());
        }
        let Some(shell) = ctx.shell.as_deref() else {
            return Err("SHELL is not set, so the profile script cannot be determined".to_string());
        };
        rc::rc_name_for_shell(shell)
            .map(|name| ctx.home.join(name))
            .ok_or_else(|| format!("unknown profile script for shell {shell:?}"))
    }
}

impl Task for EditShellRc {
    fn name(&self) -> &'static str {
        "Edit shell profile"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.options.edit_policy != EditPolicy::Deny
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = match Self::target(ctx) {
            Ok(path) => path,
            Err(reason) => return Ok(TaskResult::Skipped(reason)),
        };

        let current = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        let layout = ctx.layout();
        let managed = rc::managed_lines(&layout.bin(), &layout.profile());
        let content = rc::edited_content(&current, &managed);

        let mut ask = || -> Result<bool> {
            let mut stdout = io::stdout().lock();
            let answer = rc::ask_yes_no("Continue? ", &mut io::stdin().lock(), &mut stdout)?;
            writeln!(stdout, "{}", if answer { "Proceeding" } else { "Skipping" })?;
            Ok(answer)
        };
        let confirm = (ctx.options.edit_policy == EditPolicy::Ask)
            .then_some(&mut ask as &mut dyn FnMut() -> Result<bool>);

        match rc::apply_edit(&path, &content, confirm, &*ctx.log, ctx.dry_run)? {
            RcOutcome::Unchanged => Ok(TaskResult::Skipped("no changes necessary".to_string())),
            RcOutcome::Declined => Ok(TaskResult::Skipped("declined".to_string())),
            RcOutcome::DryRun => Ok(TaskResult::DryRun),
            RcOutcome::Created => {
                ctx.log.info(&format!("created {}", path.display()));
                Ok(TaskResult::Ok)
            }
            RcOutcome::Updated { backup } => {
                ctx.log.info(&format!(
                    "updated {} (previous version saved to {})",
                    path.display(),
                    backup.display()
                ));
                Ok(TaskResult::Ok)
            }
        }
    }
}
