//! Per-run state shared by install tasks.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, Layout};
use crate::exec::Executor;
use crate::install::rc::EditPolicy;
use crate::logging::Log;

/// Install options taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Recreate the virtual environment even if it exists.
    pub force_venv: bool,
    /// Whether the shell startup file may be edited.
    pub edit_policy: EditPolicy,
    /// Startup file to edit instead of the one derived from `$SHELL`.
    pub rcfile: Option<PathBuf>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            force_venv: false,
            edit_policy: EditPolicy::Ask,
            rcfile: None,
        }
    }
}

/// Shared context for task execution.
pub struct Context {
    /// Repository layout and manifest.
    pub config: Config,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Command-line install options.
    pub options: InstallOptions,
    /// Value of `$SHELL`, if set.
    pub shell: Option<String>,
    /// Value of `$VIRTUAL_ENV`, if set.
    pub virtual_env: Option<String>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("executor", &"<dyn Executor>")
            .field("options", &self.options)
            .field("shell", &self.shell)
            .field("virtual_env", &self.virtual_env)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME environment variable is not set.
    pub fn new(
        config: Config,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        options: InstallOptions,
    ) -> Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))?;

        Ok(Self {
            config,
            log,
            dry_run,
            home: PathBuf::from(home),
            executor,
            options,
            shell: std::env::var("SHELL").ok().filter(|s| !s.is_empty()),
            virtual_env: std::env::var("VIRTUAL_ENV").ok(),
        })
    }

    /// Repository paths.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.config.layout
    }
}
