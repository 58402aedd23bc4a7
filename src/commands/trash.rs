//! Command: move files to the Trash.
use anyhow::Result;
use std::io;
use std::process::ExitCode;

use crate::cli::TrashOpts;
use crate::logging::Logger;
use crate::trash::driver;

/// Run the trash command.
///
/// Moved paths go to stdout; failures and protocol errors are logged.
///
/// # Errors
///
/// Returns an error if the script cannot be run or its output read.
pub fn run(opts: &TrashOpts, log: &Logger) -> Result<ExitCode> {
    let report = driver::trash(&opts.files, io::stdout().lock(), log)?;
    log.debug(&format!("{report:?}"));
    Ok(ExitCode::from(report.exit_code()))
}
