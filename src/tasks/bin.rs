//! Task: regenerate the bin directory.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::install::bundle::MdfindLocator;
use crate::install::context::InstallContext;
use crate::install::engine::Engine;
use crate::install::receipts::ReceiptLog;

/// Regenerate `bin/` from the manifest.
#[derive(Debug)]
pub struct PopulateBin;

impl Task for PopulateBin {
    fn name(&self) -> &'static str {
        "Populate bin directory"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = ctx.layout();
        let install = InstallContext::for_layout(layout);
        let engine = Engine::new(
            &install,
            ReceiptLog::new(layout.receipts()),
            &*ctx.log,
            ctx.dry_run,
        );
        let locator = MdfindLocator::new(std::sync::Arc::clone(&ctx.executor));

        let report = engine.run(&ctx.config.manifest, &locator)?;
        ctx.log.info(&format!(
            "{} removed, {} written",
            report.cleared.removed.len(),
            report.written.len()
        ));

        if ctx.dry_run {
            Ok(TaskResult::DryRun)
        } else {
            Ok(TaskResult::Ok)
        }
    }
}
