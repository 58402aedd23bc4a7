//! Domain-specific error types for the shelpers engine.
//!
//! Internal modules return typed errors (e.g., [`PlanError`], [`ReceiptError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error channels
//!
//! ```text
//! PlanError
//! ├── DependencyUnavailable(BundleError) recoverable, skip the manifest item
//! ├── DuplicateDestination               fatal, raised before execution
//! ├── DestinationOccupied                fatal, raised before execution
//! └── Other(anyhow::Error)               fatal
//! ReceiptError                           receipt log I/O and parsing
//! SetupError                             interpreter discovery
//! ```
//!
//! Only [`PlanError::DependencyUnavailable`] is caught by the planner; every
//! other variant unwinds to the process boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while locating an application bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    /// No application with the bundle identifier is installed.
    #[error("application bundle not found (bundle_id='{bundle_id}')")]
    NotFound {
        /// Bundle identifier that was searched for.
        bundle_id: String,
    },

    /// More than one application claims the bundle identifier.
    #[error("{} application bundles match bundle_id='{bundle_id}'", .matches.len())]
    Ambiguous {
        /// Bundle identifier that was searched for.
        bundle_id: String,
        /// Every matching bundle path, in search order.
        matches: Vec<PathBuf>,
    },

    /// The system search could not be performed.
    #[error("bundle lookup failed for '{bundle_id}': {reason}")]
    Lookup {
        /// Bundle identifier that was searched for.
        bundle_id: String,
        /// Human-readable reason reported by the search tool.
        reason: String,
    },
}

/// Errors raised while turning the manifest into a plan.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A manifest item depends on something missing from this machine.
    ///
    /// This is the only recoverable planning error: the item is skipped and
    /// the run continues.
    #[error("skipping {action}: {source}")]
    DependencyUnavailable {
        /// Description of the manifest item that was skipped.
        action: String,
        /// Why the dependency could not be resolved.
        #[source]
        source: BundleError,
    },

    /// Two manifest items write to the same file.
    #[error(
        "multiple entries in manifest attempting to write to the same file '{}'",
        .path.display()
    )]
    DuplicateDestination {
        /// The contested destination path.
        path: PathBuf,
    },

    /// A planned destination already exists and was not created by a
    /// previous run.
    #[error("refusing to overwrite '{}': not created by a previous run", .path.display())]
    DestinationOccupied {
        /// The occupied destination path.
        path: PathBuf,
    },

    /// Any other failure while planning.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlanError {
    /// Whether the planner may skip the offending item and continue.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DependencyUnavailable { .. })
    }
}

/// Errors that arise from reading or writing the receipt log.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// The receipt log could not be read or written.
    #[error("receipt log {}: {source}", .path.display())]
    Io {
        /// Path of the receipt log.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A receipt line is not a quoted path literal.
    #[error("receipt log {} line {line}: malformed entry {text:?}", .path.display())]
    Malformed {
        /// Path of the receipt log.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// A path cannot be represented in the receipt log.
    #[error("cannot record non UTF-8 path {}", .path.display())]
    NonUtf8Path {
        /// The path that could not be recorded.
        path: PathBuf,
    },
}

/// Errors that arise while preparing the interpreter environment.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The installer was started from inside a virtual environment.
    #[error("refusing to run installer while a virtualenv is active ({0})")]
    VirtualEnvActive(String),

    /// No suitable interpreter is on `PATH`.
    #[error("could not find a Python interpreter in $PATH with version >= {0}")]
    NoInterpreter(String),

    /// A required tool reported a version string that cannot be parsed.
    #[error("unexpected version from '{program}': {output:?}")]
    UnexpectedVersion {
        /// Program that was queried.
        program: String,
        /// Raw version output.
        output: String,
    },
}
