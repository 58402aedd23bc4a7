//! Command: print version information.
use anyhow::Result;
use std::io::Write;

/// Print the shelpers version to `out`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(mut out: impl Write) -> Result<()> {
    writeln!(out, "shelpers {}", super::version())?;
    Ok(())
}
