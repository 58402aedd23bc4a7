//! Shell helper installer and macOS utilities.
//!
//! `shelpers install` turns the `conf/bin.toml` manifest into launcher
//! scripts and symlinks under `bin/`, prepares the Python environment the
//! launchers run in, and puts `bin/` on the shell's `PATH`.
//! `shelpers trash` moves files to the Trash through Finder.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: repository layout and manifest parsing
//! - **[`install`]**: the plan-and-execute engine behind `bin/`
//! - **[`trash`]**: the Finder script driver and its line protocol
//! - **[`tasks`]**: named install steps run in order
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod install;
pub mod logging;
pub mod tasks;
pub mod trash;
