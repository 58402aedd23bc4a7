//! Concrete filesystem writes produced by planning.
use anyhow::{Context as _, Result};
use std::fs;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

/// Mode applied to generated scripts.
pub const SCRIPT_MODE: u32 = 0o755;

/// A single file to create in `bin/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// An executable text file.
    ScriptFile {
        /// Destination path.
        path: PathBuf,
        /// Full file contents.
        contents: String,
    },
    /// A symbolic link.
    Symlink {
        /// Destination path of the link itself.
        path: PathBuf,
        /// Link content, relative to the link's directory or absolute.
        target: PathBuf,
    },
}

impl FileAction {
    /// Path this action writes to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::ScriptFile { path, .. } | Self::Symlink { path, .. } => path,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::ScriptFile { path, .. } => format!("script {}", path.display()),
            Self::Symlink { path, target } => {
                format!("{} -> {}", path.display(), target.display())
            }
        }
    }

    /// Perform the write.
    ///
    /// Never replaces an existing file: the destination must be free.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination exists or cannot be written.
    pub fn execute(&self) -> Result<()> {
        match self {
            Self::ScriptFile { path, contents } => {
                let mut file = fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .with_context(|| format!("create script: {}", path.display()))?;
                file.write_all(contents.as_bytes())
                    .with_context(|| format!("write script: {}", path.display()))?;
                fs::set_permissions(path, fs::Permissions::from_mode(SCRIPT_MODE))
                    .with_context(|| format!("chmod script: {}", path.display()))?;
            }
            Self::Symlink { path, target } => {
                std::os::unix::fs::symlink(target, path)
                    .with_context(|| format!("create link: {}", path.display()))?;
            }
        }
        Ok(())
    }
}
