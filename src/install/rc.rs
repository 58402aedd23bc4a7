//! Shell startup file edits that put `bin/` on `PATH`.
use anyhow::{Context as _, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::script::shell_quote;
use crate::logging::Log;

/// Trailing marker on the `PATH` line.
pub const PATH_COMMENT: &str = "# Adds shelpers to PATH";
/// Trailing marker on the init-script loop.
pub const INCLUDE_COMMENT: &str = "# Sources init scripts from shelpers";
/// Suffix of the copy kept before an edit.
pub const BACKUP_SUFFIX: &str = ".shelpers-backup";

/// Whether the installer may modify the user's shell startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPolicy {
    /// Edit without asking.
    Allow,
    /// Never edit.
    Deny,
    /// Show the change and ask for confirmation.
    Ask,
}

/// Result of [`apply_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RcOutcome {
    /// The file already had the same significant lines.
    Unchanged,
    /// The user declined the edit.
    Declined,
    /// The edit was previewed only.
    DryRun,
    /// The file did not exist and was created.
    Created,
    /// The file was rewritten; the previous version is at `backup`.
    Updated {
        /// Copy of the previous contents.
        backup: PathBuf,
    },
}

/// Startup file name for a shell, keyed by the basename of `$SHELL`.
#[must_use]
pub fn rc_name_for_shell(shell: &str) -> Option<&'static str> {
    let name = Path::new(shell).file_name()?.to_str()?;
    match name {
        "bash" => Some(".bash_profile"),
        "zsh" => Some(".zshrc"),
        _ => None,
    }
}

/// Path of the backup copy for `rc`.
#[must_use]
pub fn backup_path(rc: &Path) -> PathBuf {
    let mut name = rc.file_name().unwrap_or_default().to_os_string();
    name.push(BACKUP_SUFFIX);
    rc.with_file_name(name)
}

/// The lines the installer owns in the startup file.
#[must_use]
pub fn managed_lines(bin: &Path, profile: &Path) -> [String; 2] {
    [
        format!(
            "export PATH=\"$PATH\":{}  {PATH_COMMENT}",
            shell_quote(&bin.to_string_lossy())
        ),
        format!(
            "for file in {}/init-*.sh; do [ -r \"$file\" ] && . \"$file\"; done  {INCLUDE_COMMENT}",
            shell_quote(&profile.to_string_lossy())
        ),
    ]
}

fn is_managed(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with(PATH_COMMENT) || line.ends_with(INCLUDE_COMMENT)
}

/// Replace previously managed lines in `current` with `managed`.
///
/// Old managed lines are dropped wherever they are; the new ones are
/// appended after a blank separator line.
#[must_use]
pub fn edited_content(current: &str, managed: &[String]) -> String {
    let mut out: String = current
        .split_inclusive('\n')
        .filter(|line| !is_managed(line))
        .collect();
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        let last = out.trim_end_matches('\n').rsplit('\n').next().unwrap_or("");
        if !out.ends_with("\n\n") && !last.trim().is_empty() {
            out.push('\n');
        }
    }
    for line in managed {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Non-blank lines of `text`.
#[must_use]
pub fn significant_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

/// Prompt until the user answers yes or no. End of input means no.
///
/// # Errors
///
/// Returns an error if the prompt cannot be written or input cannot be read.
pub fn ask_yes_no(prompt: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<bool> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        let answer = answer.trim().to_lowercase();
        if !answer.is_empty() {
            if "yes".starts_with(&answer) {
                return Ok(true);
            }
            if "no".starts_with(&answer) {
                return Ok(false);
            }
        }
        writeln!(output, "Enter y or n, or press Control-D to cancel")?;
    }
}

/// Write `new_content` to `rc`, backing up the old file first.
///
/// Nothing is written when the significant lines are unchanged. With
/// `confirm`, the change is shown and the user is asked first.
///
/// # Errors
///
/// Returns an error if the file cannot be read, backed up or written.
pub fn apply_edit(
    rc: &Path,
    new_content: &str,
    confirm: Option<&mut dyn FnMut() -> Result<bool>>,
    log: &dyn Log,
    dry_run: bool,
) -> Result<RcOutcome> {
    let current = match fs::read_to_string(rc) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e).with_context(|| format!("read {}", rc.display())),
    };

    if let Some(current) = &current
        && significant_lines(current) == significant_lines(new_content)
    {
        log.info(&format!("{}: no changes necessary", rc.display()));
        return Ok(RcOutcome::Unchanged);
    }

    let old_lines = current.as_deref().map(significant_lines).unwrap_or_default();
    let new_lines = significant_lines(new_content);
    if current.is_some() {
        log.info(&format!("the following changes will be made to {}:", rc.display()));
    } else {
        log.info(&format!("{} will be created with:", rc.display()));
    }
    for line in old_lines.iter().filter(|l| !new_lines.contains(l)) {
        log.info(&format!("- {line}"));
    }
    for line in new_lines.iter().filter(|l| !old_lines.contains(l)) {
        log.info(&format!("+ {line}"));
    }

    if dry_run {
        log.dry_run(&format!("would write {}", rc.display()));
        return Ok(RcOutcome::DryRun);
    }

    if let Some(confirm) = confirm
        && !confirm()?
    {
        log.info("skipping");
        return Ok(RcOutcome::Declined);
    }

    let outcome = if current.is_some() {
        let backup = backup_path(rc);
        fs::copy(rc, &backup)
            .with_context(|| format!("back up {} to {}", rc.display(), backup.display()))?;
        RcOutcome::Updated { backup }
    } else {
        RcOutcome::Created
    };
    fs::write(rc, new_content).with_context(|| format!("write {}", rc.display()))?;
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::test_helpers::RecordingLog;

    fn lines() -> [String; 2] {
        managed_lines(Path::new("/Users/me/shelpers/bin"), Path::new("/Users/me/shelpers/profile"))
    }

    #[test]
    fn rc_name_uses_shell_basename() {
        assert_eq!(rc_name_for_shell("/bin/zsh"), Some(".zshrc"));
        assert_eq!(rc_name_for_shell("/usr/local/bin/bash"), Some(".bash_profile"));
        assert_eq!(rc_name_for_shell("/usr/bin/fish"), None);
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/home/u/.zshrc")),
            PathBuf::from("/home/u/.zshrc.shelpers-backup")
        );
    }

    #[test]
    fn managed_lines_quote_paths() {
        let lines = managed_lines(Path::new("/Users/me/my tools/bin"), Path::new("/p"));
        assert_eq!(
            lines[0],
            "export PATH=\"$PATH\":'/Users/me/my tools/bin'  # Adds shelpers to PATH"
        );
        assert_eq!(
            lines[1],
            concat!(
                "for file in /p/init-*.sh; do [ -r \"$file\" ] && . \"$file\"; done",
                "  # Sources init scripts from shelpers"
            )
        );
    }

    #[test]
    fn edit_into_empty_file() {
        let out = edited_content("", &lines());
        assert_eq!(significant_lines(&out).len(), 2);
        assert!(!out.starts_with('\n'));
    }

    #[test]
    fn edit_adds_blank_separator() {
        let out = edited_content("alias ll='ls -l'", &lines());
        assert!(out.starts_with("alias ll='ls -l'\n\nexport PATH="));
    }

    #[test]
    fn edit_replaces_old_managed_lines() {
        let current = "export PATH=\"$PATH\":/old/bin  # Adds shelpers to PATH\nalias x=y\n\n";
        let out = edited_content(current, &lines());
        assert!(!out.contains("/old/bin"));
        assert!(out.starts_with("alias x=y\n\nexport PATH="));
    }

    #[test]
    fn edit_is_stable_on_second_pass() {
        let once = edited_content("alias x=y\n", &lines());
        let twice = edited_content(&once, &lines());
        assert_eq!(once, twice);
    }

    #[test]
    fn ask_accepts_prefixes_and_reprompts() {
        let mut input = io::Cursor::new("maybe\n\nY\n");
        let mut output = Vec::new();
        assert!(ask_yes_no("Continue? ", &mut input, &mut output).unwrap());
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Continue? ").count(), 3);
        assert!(shown.contains("Enter y or n"));
    }

    #[test]
    fn ask_treats_eof_as_no() {
        let mut input = io::Cursor::new("");
        let mut output = Vec::new();
        assert!(!ask_yes_no("Continue? ", &mut input, &mut output).unwrap());
    }

    #[test]
    fn apply_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        let content = edited_content("", &lines());
        let outcome = apply_edit(&rc, &content, None, &RecordingLog::default(), false).unwrap();
        assert_eq!(outcome, RcOutcome::Created);
        assert_eq!(fs::read_to_string(&rc).unwrap(), content);
    }

    #[test]
    fn apply_backs_up_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        fs::write(&rc, "alias x=y\n").unwrap();
        let content = edited_content("alias x=y\n", &lines());
        let outcome = apply_edit(&rc, &content, None, &RecordingLog::default(), false).unwrap();
        let backup = backup_path(&rc);
        assert_eq!(outcome, RcOutcome::Updated { backup: backup.clone() });
        assert_eq!(fs::read_to_string(backup).unwrap(), "alias x=y\n");
    }

    #[test]
    fn apply_skips_when_only_blank_lines_differ() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        let content = edited_content("alias x=y\n", &lines());
        fs::write(&rc, content.replace("\n\n", "\n")).unwrap();
        let outcome = apply_edit(&rc, &content, None, &RecordingLog::default(), false).unwrap();
        assert_eq!(outcome, RcOutcome::Unchanged);
        assert!(!backup_path(&rc).exists());
    }

    #[test]
    fn apply_respects_declined_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bash_profile");
        fs::write(&rc, "alias x=y\n").unwrap();
        let mut decline = || Ok(false);
        let outcome = apply_edit(
            &rc,
            "changed\n",
            Some(&mut decline),
            &RecordingLog::default(),
            false,
        )
        .unwrap();
        assert_eq!(outcome, RcOutcome::Declined);
        assert_eq!(fs::read_to_string(&rc).unwrap(), "alias x=y\n");
    }

    #[test]
    fn apply_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        let log = RecordingLog::default();
        let outcome = apply_edit(&rc, "new\n", None, &log, true).unwrap();
        assert_eq!(outcome, RcOutcome::DryRun);
        assert!(!rc.exists());
        assert!(log.at("info").contains(&"+ new".to_string()));
    }
}
