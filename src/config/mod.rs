//! Repository layout and configuration loading.
pub mod manifest;
pub mod toml_loader;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::install::actions::BinAction;

/// Well-known paths inside a shelpers repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Describe the repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generated executables directory.
    #[must_use]
    pub fn bin(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Receipt log of files written by the previous install.
    #[must_use]
    pub fn receipts(&self) -> PathBuf {
        self.root.join("bin.log")
    }

    /// Virtual environment directory.
    #[must_use]
    pub fn venv(&self) -> PathBuf {
        self.root.join("venv")
    }

    /// Interpreter inside the virtual environment.
    #[must_use]
    pub fn venv_python(&self) -> PathBuf {
        self.venv().join("bin").join("python")
    }

    /// Python requirements file.
    #[must_use]
    pub fn requirements(&self) -> PathBuf {
        self.root.join("requirements.txt")
    }

    /// Directory of `init-*.sh` scripts sourced by the shell profile.
    #[must_use]
    pub fn profile(&self) -> PathBuf {
        self.root.join("profile")
    }

    /// Manifest describing the contents of `bin/`.
    #[must_use]
    pub fn manifest(&self) -> PathBuf {
        self.root.join("conf").join("bin.toml")
    }
}

/// All loaded configuration for a repository.
#[derive(Debug)]
pub struct Config {
    /// Repository paths.
    pub layout: Layout,
    /// Bin actions in manifest order.
    pub manifest: Vec<BinAction>,
}

impl Config {
    /// Load the manifest from `conf/bin.toml` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or contains an invalid entry.
    pub fn load(root: &Path) -> Result<Self> {
        let layout = Layout::new(root);
        let manifest = manifest::load(&layout.manifest()).context("loading conf/bin.toml")?;
        Ok(Self { layout, manifest })
    }
}
