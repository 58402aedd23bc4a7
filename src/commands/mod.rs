//! Top-level subcommand orchestration.
pub mod install;
pub mod trash;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "SHELPERS_ROOT";

/// Whether `dir` looks like a shelpers repository.
fn is_repo_root(dir: &Path) -> bool {
    dir.join("conf").join("bin.toml").is_file()
}

/// Resolve the shelpers root directory from CLI arguments or auto-detection.
///
/// The result is absolute, so generated files can refer to it from anywhere.
///
/// # Errors
///
/// Returns an error if the root directory cannot be determined or doesn't exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let explicit = global
        .root
        .clone()
        .or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from));
    if let Some(root) = explicit {
        return dunce::canonicalize(&root)
            .with_context(|| format!("shelpers root {} does not exist", root.display()));
    }

    // Installed as <root>/target/<profile>/shelpers
    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidate = parent.join("../..");
        if is_repo_root(&candidate) {
            return Ok(dunce::canonicalize(candidate)?);
        }
    }

    let cwd = std::env::current_dir()?;
    if is_repo_root(&cwd) {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine shelpers root. Use --root or set {ROOT_ENV} env var");
}

/// Version string baked in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("SHELPERS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolve_root_uses_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
            dry_run: false,
        };

        let root = resolve_root(&global).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn resolve_root_rejects_missing_explicit_root() {
        let global = GlobalOpts {
            root: Some(PathBuf::from("/definitely/not/a/shelpers/root")),
            dry_run: false,
        };

        let err = resolve_root(&global).unwrap_err();
        assert!(err.to_string().contains("does not exist"), "{err}");
    }

    #[test]
    fn repo_root_needs_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_repo_root(dir.path()));
        std::fs::create_dir(dir.path().join("conf")).unwrap();
        std::fs::write(dir.path().join("conf/bin.toml"), "").unwrap();
        assert!(is_repo_root(dir.path()));
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
