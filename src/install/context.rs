//! Paths fixed for one install run.
use std::path::{Path, PathBuf};

use crate::config::Layout;

/// Paths shared by every bin action during one install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallContext {
    /// Repository root; relative manifest paths are resolved against it.
    pub root: PathBuf,
    /// Directory that receives generated executables.
    pub bin: PathBuf,
    /// Interpreter invoked by generated Python launchers.
    pub interpreter: PathBuf,
}

impl InstallContext {
    /// Build a context from explicit paths.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        bin: impl Into<PathBuf>,
        interpreter: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            bin: bin.into(),
            interpreter: interpreter.into(),
        }
    }

    /// Build the standard context for a repository layout.
    #[must_use]
    pub fn for_layout(layout: &Layout) -> Self {
        Self::new(layout.root(), layout.bin(), layout.venv_python())
    }

    /// Resolve a manifest path relative to the repository root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_layout_uses_venv_interpreter() {
        let ctx = InstallContext::for_layout(&Layout::new("/repo"));
        assert_eq!(ctx.bin, PathBuf::from("/repo/bin"));
        assert_eq!(ctx.interpreter, PathBuf::from("/repo/venv/bin/python"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let ctx = InstallContext::new("/repo", "/repo/bin", "/usr/bin/python3");
        assert_eq!(ctx.resolve(Path::new("/opt/tool")), PathBuf::from("/opt/tool"));
        assert_eq!(ctx.resolve(Path::new("src/a.py")), PathBuf::from("/repo/src/a.py"));
    }
}
