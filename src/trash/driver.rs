//! Runs the trash script and matches its records to the requested paths.
use anyhow::{Context as _, Result};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use super::protocol::{LineParser, TrashResult};
use super::script::SCRIPT;
use crate::logging::Log;

/// Interpreter that runs the script.
pub const OSASCRIPT: &str = "/usr/bin/osascript";

/// Exit status when every file was moved.
pub const EXIT_OK: u8 = 0;
/// Exit status when some files could not be moved.
pub const EXIT_FAILURES: u8 = 1;
/// Exit status when the record stream could not be trusted.
pub const EXIT_PROTOCOL: u8 = 2;

/// Totals for one trash run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrashReport {
    /// Files moved to the Trash.
    pub trashed: usize,
    /// Files the script reported as not moved.
    pub failures: usize,
    /// Records beyond the number of requested paths.
    pub excess: usize,
    /// Requested paths with no record when the stream ended.
    pub missing: usize,
    /// Protocol violations.
    pub violations: usize,
}

impl TrashReport {
    /// Process exit status for this report.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.excess > 0 || self.missing > 0 || self.violations > 0 {
            EXIT_PROTOCOL
        } else if self.failures > 0 {
            EXIT_FAILURES
        } else {
            EXIT_OK
        }
    }
}

/// Pairs completed records with requested paths by position.
///
/// The script handles its arguments in order and emits one record each,
/// so the N-th record belongs to the N-th path.
pub struct Correlator<'a, W> {
    requested: &'a [PathBuf],
    out: W,
    log: &'a dyn Log,
    next: usize,
    report: TrashReport,
}

impl<W> std::fmt::Debug for Correlator<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator")
            .field("requested", &self.requested)
            .field("next", &self.next)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl<'a, W: Write> Correlator<'a, W> {
    /// Start matching records against `requested`.
    ///
    /// Moved paths are written to `out` one per line, as given.
    pub fn new(requested: &'a [PathBuf], out: W, log: &'a dyn Log) -> Self {
        Self {
            requested,
            out,
            log,
            next: 0,
            report: TrashReport::default(),
        }
    }

    /// Account for one completed record.
    ///
    /// # Errors
    ///
    /// Returns an error if a moved path cannot be written to the output.
    pub fn record(&mut self, result: TrashResult) -> Result<()> {
        let Some(path) = self.requested.get(self.next) else {
            self.report.excess += 1;
            self.log.error(&format!("excess result: {result:?}"));
            return Ok(());
        };
        self.next += 1;
        if result.ok {
            writeln!(self.out, "{}", path.display()).context("write trashed path")?;
            self.report.trashed += 1;
        } else {
            self.log
                .error(&format!("{}: {}", path.display(), failure_message(&result)));
            self.report.failures += 1;
        }
        Ok(())
    }

    /// Finish the run, counting paths that never got a record.
    #[must_use]
    pub fn finish(mut self, violations: usize) -> TrashReport {
        for path in self.requested.iter().skip(self.next) {
            self.log
                .error(&format!("{}: no result reported", path.display()));
            self.report.missing += 1;
        }
        self.report.violations = violations;
        self.report
    }
}

/// `<error text> (<error number>)`, with placeholders for empty parts.
#[must_use]
pub fn failure_message(result: &TrashResult) -> String {
    let text = if result.error_text.is_empty() {
        "<no error text>"
    } else {
        result.error_text.as_str()
    };
    if result.error_number.is_empty() {
        text.to_string()
    } else {
        format!("{text} ({})", result.error_number)
    }
}

/// Parse the record stream from `reader` and correlate it with `requested`.
///
/// Lines are decoded lossily. Violations are logged and counted; parsing
/// carries on after each one.
///
/// # Errors
///
/// Returns an error if the stream cannot be read or output cannot be written.
pub fn consume(
    mut reader: impl BufRead,
    requested: &[PathBuf],
    out: impl Write,
    log: &dyn Log,
) -> Result<TrashReport> {
    let mut parser = LineParser::new();
    let mut correlator = Correlator::new(requested, out, log);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader
            .read_until(b'\n', &mut buf)
            .context("read script output")?
            == 0
        {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        match parser.feed(&line) {
            Ok(Some(result)) => correlator.record(result)?,
            Ok(None) => {}
            Err(violation) => log.error(&violation.to_string()),
        }
    }
    if let Err(violation) = parser.finish() {
        log.error(&violation.to_string());
    }
    Ok(correlator.finish(parser.violation_count()))
}

/// Move `files` to the Trash through Finder.
///
/// Paths are made absolute before they are handed to the script; the
/// output lists them as given.
///
/// # Errors
///
/// Returns an error if the script cannot be started or its output read.
pub fn trash(files: &[PathBuf], out: impl Write, log: &dyn Log) -> Result<TrashReport> {
    let args = files
        .iter()
        .map(|p| std::path::absolute(p).with_context(|| format!("resolve {}", p.display())))
        .collect::<Result<Vec<PathBuf>>>()?;

    let mut child = Command::new(OSASCRIPT)
        .arg("-")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute: {OSASCRIPT}"))?;

    {
        let mut stdin = child.stdin.take().context("script stdin unavailable")?;
        stdin
            .write_all(SCRIPT.as_bytes())
            .context("send script to osascript")?;
    }

    collect(&mut child, files, out, log)
}

/// Read the script's result stream, then reap the child even if reading failed.
fn collect(
    child: &mut Child,
    requested: &[PathBuf],
    out: impl Write,
    log: &dyn Log,
) -> Result<TrashReport> {
    let stderr = child.stderr.take().context("script stderr unavailable")?;
    let result = consume(BufReader::new(stderr), requested, out, log);

    let status = child.wait().context("wait for osascript")?;
    log.debug(&format!("{OSASCRIPT} exited with {status}"));
    result
}
