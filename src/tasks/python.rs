//! Tasks: Python virtual environment and requirements.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::install::python;

/// Check the host interpreter and create `venv/`.
#[derive(Debug)]
pub struct CreateVirtualEnv;

impl Task for CreateVirtualEnv {
    fn name(&self) -> &'static str {
        "Create virtual environment"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        python::check_no_virtualenv(ctx.virtual_env.as_deref())?;
        let interpreter = python::find_interpreter(&*ctx.executor)?;
        ctx.log.info(&format!("using {interpreter}"));

        let venv = ctx.layout().venv();
        if ctx.dry_run {
            if venv.is_dir() && !ctx.options.force_venv {
                return Ok(TaskResult::Skipped("virtual environment exists".to_string()));
            }
            ctx.log
                .dry_run(&format!("would create virtual environment {}", venv.display()));
            return Ok(TaskResult::DryRun);
        }

        let created = python::create_venv(
            &*ctx.executor,
            &interpreter,
            &venv,
            ctx.options.force_venv,
            &*ctx.log,
        )?;
        if created {
            Ok(TaskResult::Ok)
        } else {
            Ok(TaskResult::Skipped("virtual environment exists".to_string()))
        }
    }
}

/// Install `requirements.txt` into `venv/`.
#[derive(Debug)]
pub struct InstallRequirements;

impl Task for InstallRequirements {
    fn name(&self) -> &'static str {
        "Install requirements"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.layout().requirements().is_file()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = ctx.layout();
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would install {}",
                layout.requirements().display()
            ));
            return Ok(TaskResult::DryRun);
        }
        python::install_requirements(
            &*ctx.executor,
            &layout.venv_python(),
            &layout.requirements(),
            &*ctx.log,
        )?;
        Ok(TaskResult::Ok)
    }
}
