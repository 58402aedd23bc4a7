//! Clear, plan and execute phases of a bin directory install.
use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::actions::BinAction;
use super::bundle::BundleLocator;
use super::context::InstallContext;
use super::plan::Plan;
use super::receipts::ReceiptLog;
use crate::error::PlanError;
use crate::logging::Log;

/// Outcome of the clear phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClearReport {
    /// Previously written files that were (or in a dry run would be) deleted.
    pub removed: Vec<PathBuf>,
    /// Receipt entries whose file was already gone.
    pub missing: Vec<PathBuf>,
    /// Receipt entries that point outside `bin/` and were left alone.
    pub ignored: Vec<PathBuf>,
    /// Non-hidden names still in `bin/` that no receipt accounts for.
    pub leftovers: Vec<String>,
}

/// Outcome of a full run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// What the clear phase did.
    pub cleared: ClearReport,
    /// Destinations written, relative to `bin/`, in execution order.
    pub written: Vec<PathBuf>,
}

/// A receipt entry is only acted on if it names a path strictly below `bin/`.
fn is_safe_receipt(entry: &Path) -> bool {
    entry.components().next().is_some()
        && entry
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Converges `bin/` on the manifest, tracking what it writes.
pub struct Engine<'a> {
    ctx: &'a InstallContext,
    receipts: ReceiptLog,
    log: &'a dyn Log,
    dry_run: bool,
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("ctx", &self.ctx)
            .field("receipts", &self.receipts)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<'a> Engine<'a> {
    /// Create an engine writing into `ctx.bin` and recording to `receipts`.
    #[must_use]
    pub const fn new(
        ctx: &'a InstallContext,
        receipts: ReceiptLog,
        log: &'a dyn Log,
        dry_run: bool,
    ) -> Self {
        Self {
            ctx,
            receipts,
            log,
            dry_run,
        }
    }

    /// Delete everything the previous run recorded, then the receipt log.
    ///
    /// Files that are already gone are tolerated. Anything left in `bin/`
    /// afterwards (other than dot files) is reported, never deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt log is unreadable or a recorded file
    /// exists but cannot be removed.
    pub fn clear(&self) -> Result<ClearReport> {
        let mut report = ClearReport::default();

        for entry in self.receipts.load()? {
            if !is_safe_receipt(&entry) {
                self.log.warn(&format!(
                    "ignoring receipt entry outside bin directory: {}",
                    entry.display()
                ));
                report.ignored.push(entry);
                continue;
            }
            let path = self.ctx.bin.join(&entry);
            let exists = path.symlink_metadata().is_ok();
            if self.dry_run {
                if exists {
                    self.log.dry_run(&format!("would remove {}", path.display()));
                    report.removed.push(path);
                } else {
                    report.missing.push(path);
                }
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    self.log.debug(&format!("removed {}", path.display()));
                    report.removed.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    self.log.debug(&format!("already gone: {}", path.display()));
                    report.missing.push(path);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("remove {}", path.display()));
                }
            }
        }

        if self.dry_run {
            self.log.dry_run(&format!(
                "would delete receipt log {}",
                self.receipts.path().display()
            ));
        } else {
            self.receipts.clear()?;
        }

        report.leftovers = self.leftovers(&report.removed)?;
        if !report.leftovers.is_empty() {
            self.log.info("Not clearing:");
            for name in &report.leftovers {
                self.log.info(&format!("  {name:?}"));
            }
        }
        Ok(report)
    }

    fn leftovers(&self, removed: &[PathBuf]) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.ctx.bin) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.ctx.bin.display()));
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("read entry in {}", self.ctx.bin.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || removed.contains(&entry.path()) {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Plan the manifest and check that no destination is occupied.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`PlanError`].
    pub fn plan(
        &self,
        manifest: &[BinAction],
        locator: &dyn BundleLocator,
        cleared: &ClearReport,
    ) -> Result<Plan, PlanError> {
        let plan = Plan::build(manifest, self.ctx, locator, self.log)?;
        let pending: HashSet<PathBuf> = if self.dry_run {
            cleared.removed.iter().cloned().collect()
        } else {
            HashSet::new()
        };
        plan.ensure_destinations_free(&pending)?;
        Ok(plan)
    }

    /// Write every planned file, recording each before it is written.
    ///
    /// # Errors
    ///
    /// Returns an error if `bin/` cannot be created, a receipt cannot be
    /// appended, or a write fails. Receipts already appended stay valid.
    pub fn execute(&self, plan: Plan) -> Result<Vec<PathBuf>> {
        let bin = &self.ctx.bin;
        if !self.dry_run {
            fs::create_dir_all(bin).with_context(|| format!("create {}", bin.display()))?;
        }

        let mut written = Vec::with_capacity(plan.len());
        for action in plan {
            let relative = action
                .destination()
                .strip_prefix(bin)
                .with_context(|| {
                    format!(
                        "planned destination outside {}: {}",
                        bin.display(),
                        action.destination().display()
                    )
                })?
                .to_path_buf();

            if self.dry_run {
                self.log
                    .dry_run(&format!("would write {}", action.description()));
            } else {
                self.receipts.append(&relative)?;
                self.log.info(&format!("  {:?}", relative.display().to_string()));
                action.execute()?;
            }
            written.push(relative);
        }
        Ok(written)
    }

    /// Clear, plan and execute.
    ///
    /// # Errors
    ///
    /// Returns an error from whichever phase fails first; planning errors
    /// abort before anything is written.
    pub fn run(&self, manifest: &[BinAction], locator: &dyn BundleLocator) -> Result<RunReport> {
        let cleared = self.clear()?;
        let plan = self.plan(manifest, locator, &cleared)?;
        let written = self.execute(plan)?;
        Ok(RunReport { cleared, written })
    }
}
