//! Log file location, ANSI stripping and timestamps.
use std::fs;
use std::path::PathBuf;

/// `strftime` pattern for the run header.
pub(super) const DATETIME: &str = "%Y-%m-%d %H:%M:%S";
/// `strftime` pattern for each log line.
pub(super) const TIME: &str = "%H:%M:%S";

/// Remove CSI escape sequences (colors, cursor movement) from `s`.
///
/// A lone `ESC` and the character after it are dropped too.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            // Parameters run until the final byte in `@`..=`~`.
            let _final = chars.by_ref().find(|c| ('@'..='~').contains(c));
        }
    }
    out
}

/// `$XDG_CACHE_HOME/shelpers`, falling back to `~/.cache/shelpers`.
///
/// The directory is created if missing; `None` if that fails.
pub(super) fn cache_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"));
    let dir = base.join("shelpers");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for one subcommand, e.g. `~/.cache/shelpers/install.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with `pattern`.
pub(super) fn utc_now(pattern: &str) -> String {
    chrono::Utc::now().format(pattern).to_string()
}
