//! Record of files written by the previous install.
//!
//! One JSON string literal per line, each a path relative to `bin/`.
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use crate::error::ReceiptError;

/// Append-only log of destinations, cleared wholesale before each run.
#[derive(Debug, Clone)]
pub struct ReceiptLog {
    path: PathBuf,
}

impl ReceiptLog {
    /// Use the log at `path`; the file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ReceiptError {
        ReceiptError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read every recorded path. A missing log yields no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or a line is not a
    /// quoted string.
    pub fn load(&self) -> Result<Vec<PathBuf>, ReceiptError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim_end().is_empty())
            .map(|(i, line)| {
                let line = line.trim_end();
                serde_json::from_str::<String>(line)
                    .map(PathBuf::from)
                    .map_err(|_| ReceiptError::Malformed {
                        path: self.path.clone(),
                        line: i + 1,
                        text: line.to_string(),
                    })
            })
            .collect()
    }

    /// Delete the log. A missing log is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), ReceiptError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(self.io_error(e)),
            _ => Ok(()),
        }
    }

    /// Record `relative` as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not UTF-8 or the log cannot be written.
    pub fn append(&self, relative: &Path) -> Result<(), ReceiptError> {
        let text = relative.to_str().ok_or_else(|| ReceiptError::NonUtf8Path {
            path: relative.to_path_buf(),
        })?;
        let line = serde_json::Value::String(text.to_string()).to_string();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_error(e))
    }
}
