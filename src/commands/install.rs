//! Command: regenerate bin/ and prepare the shell environment.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::Config;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, InstallOptions};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the manifest fails to
/// load, or a task fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let root = super::resolve_root(global)?;
    log.info(&format!("shelpers {}", super::version()));
    log.debug(&format!("root: {}", root.display()));

    log.stage("Loading manifest");
    let config = Config::load(&root)?;
    log.info(&format!("loaded {} bin entries", config.manifest.len()));
    for action in &config.manifest {
        log.debug(&format!("  {}: {}", action.name_hint(), action.description()));
    }

    let options = InstallOptions {
        force_venv: opts.force_venv,
        edit_policy: opts.edit_policy(),
        rcfile: opts.rcfile.clone(),
    };
    let ctx = Context::new(
        config,
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(SystemExecutor),
        options,
    )?;

    let all_tasks = tasks::all_install_tasks();
    tasks::run_in_order(all_tasks.iter().map(AsRef::as_ref), &ctx);

    log.print_summary();

    if log.has_failures() {
        anyhow::bail!("{} task(s) failed", log.failure_count());
    }
    Ok(())
}
