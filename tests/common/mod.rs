// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed shelpers repository and a recording
// logger so each integration test can run the engine in isolation.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shelpers_cli::config::Config;
use shelpers_cli::error::BundleError;
use shelpers_cli::install::bundle::BundleLocator;
use shelpers_cli::install::context::InstallContext;
use shelpers_cli::install::engine::Engine;
use shelpers_cli::install::receipts::ReceiptLog;
use shelpers_cli::logging::{Log, TaskStatus};

/// An isolated test repository backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestRepo {
    /// Temporary directory containing the repository.
    pub root: tempfile::TempDir,
}

impl TestRepo {
    /// Create a repository with `conf/bin.toml` holding `manifest`.
    pub fn with_manifest(manifest: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let conf = root.path().join("conf");
        std::fs::create_dir_all(&conf).expect("create conf dir");
        std::fs::write(conf.join("bin.toml"), manifest).expect("write bin.toml");
        Self { root }
    }

    /// Path to the repository root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path to `bin/`.
    pub fn bin(&self) -> PathBuf {
        self.path().join("bin")
    }

    /// Write `contents` to `relative` under the root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    /// Load the repository configuration.
    pub fn config(&self) -> Config {
        Config::load(self.path()).expect("load config")
    }

    /// Context for the repository's standard layout.
    pub fn install_context(&self) -> InstallContext {
        InstallContext::for_layout(&self.config().layout)
    }

    /// Sorted file names currently in `bin/`.
    pub fn bin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.bin())
            .map(|entries| {
                entries
                    .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Run clear, plan and execute once with `locator`.
    pub fn install(
        &self,
        locator: &dyn BundleLocator,
        log: &dyn Log,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let config = self.config();
        let ctx = InstallContext::for_layout(&config.layout);
        let engine = Engine::new(&ctx, ReceiptLog::new(config.layout.receipts()), log, false);
        Ok(engine.run(&config.manifest, locator)?.written)
    }
}

/// Locator that resolves bundle identifiers from a fixed table.
pub struct FixedLocator(pub Vec<(String, PathBuf)>);

impl BundleLocator for FixedLocator {
    fn locate(&self, bundle_id: &str) -> Result<PathBuf, BundleError> {
        self.0
            .iter()
            .find(|(id, _)| id == bundle_id)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| BundleError::NotFound {
                bundle_id: bundle_id.to_string(),
            })
    }
}

/// A [`Log`] that records every message as `"<level>: <msg>"`.
#[derive(Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<String>>,
}

impl RecordingLog {
    fn push(&self, level: &str, msg: &str) {
        self.messages
            .lock()
            .expect("log mutex")
            .push(format!("{level}: {msg}"));
    }

    /// Messages recorded at `level`, without the level prefix.
    pub fn at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level}: ");
        self.messages
            .lock()
            .expect("log mutex")
            .iter()
            .filter_map(|m| m.strip_prefix(&prefix).map(String::from))
            .collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        self.push("task", &format!("{name} {status:?}"));
    }
}
