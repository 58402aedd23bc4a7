//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use crate::install::rc::EditPolicy;

/// Top-level CLI entry point for the shelpers installer.
#[derive(Parser, Debug)]
#[command(
    name = "shelpers",
    about = "Install shell helper launchers and run bundled macOS utilities",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override shelpers root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the Python environment and regenerate bin/ from the manifest
    Install(InstallOpts),
    /// Move files to the Trash through Finder
    Trash(TrashOpts),
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Recreate the virtual environment from scratch
    #[arg(long)]
    pub force_venv: bool,

    /// Edit the shell startup file without asking
    #[arg(long, conflicts_with = "no_editrc")]
    pub editrc: bool,

    /// Never edit the shell startup file
    #[arg(long)]
    pub no_editrc: bool,

    /// Shell startup file to edit instead of the one derived from $SHELL
    #[arg(long, value_name = "FILE")]
    pub rcfile: Option<PathBuf>,
}

impl InstallOpts {
    /// Resolve the shell-rc flags into a single policy.
    #[must_use]
    pub const fn edit_policy(&self) -> EditPolicy {
        if self.editrc {
            EditPolicy::Allow
        } else if self.no_editrc {
            EditPolicy::Deny
        } else {
            EditPolicy::Ask
        }
    }
}

/// Options for the `trash` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct TrashOpts {
    /// Files or directories to move to the Trash
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}
