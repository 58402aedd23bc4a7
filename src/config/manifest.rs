//! `conf/bin.toml` manifest loading.
//!
//! The manifest is an ordered `[[bin]]` array. Each entry carries a `kind`
//! tag selecting one of the bin actions:
//!
//! ```toml
//! [[bin]]
//! kind = "python"
//! script = "src/trash.py"
//!
//! [[bin]]
//! kind = "if-bundle"
//! bundle_id = "com.microsoft.VSCode"
//! link = "Contents/Resources/app/bin/code"
//! name = "vscode"
//! ```
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::toml_loader;
use crate::install::actions::{BinAction, BundleUse, Launch};

/// Top-level shape of the manifest file.
#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    bin: Vec<BinEntry>,
}

/// One `[[bin]]` entry as written in the manifest.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum BinEntry {
    Python {
        script: PathBuf,
        #[serde(default)]
        args: Vec<String>,
        name: Option<String>,
    },
    OpenPath {
        path: PathBuf,
        name: Option<String>,
    },
    OpenBundle {
        bundle_id: String,
        name: String,
    },
    Link {
        target: PathBuf,
        name: Option<String>,
    },
    IfBundle {
        bundle_id: String,
        link: Option<PathBuf>,
        open: Option<String>,
        name: Option<String>,
    },
    HabitChanger {
        old: String,
        new: String,
    },
}

impl BinEntry {
    fn into_action(self) -> Result<BinAction> {
        let action = match self {
            Self::Python { script, args, name } => BinAction::ScriptLauncher {
                name: bin_name(name, &script)?,
                launch: Launch::Python { script, args },
            },
            Self::OpenPath { path, name } => BinAction::ScriptLauncher {
                name: bin_name(name, &path)?,
                launch: Launch::OpenPath(path),
            },
            Self::OpenBundle { bundle_id, name } => BinAction::ScriptLauncher {
                name: checked_name(name)?,
                launch: Launch::OpenBundle(bundle_id),
            },
            Self::Link { target, name } => BinAction::Symlink {
                name: bin_name(name, &target)?,
                target,
            },
            Self::IfBundle {
                bundle_id,
                link,
                open,
                name,
            } => {
                let then = match (link, open) {
                    (Some(path), None) => {
                        let name = name.map(checked_name).transpose()?;
                        if name.is_none() {
                            bin_name(None, &path)?;
                        }
                        BundleUse::Link { path, name }
                    }
                    (None, Some(open)) => {
                        if name.is_some() {
                            bail!("'name' is not used with 'open'; 'open' is the opener name");
                        }
                        BundleUse::Open {
                            name: checked_name(open)?,
                        }
                    }
                    (Some(_), Some(_)) => bail!("'link' and 'open' are mutually exclusive"),
                    (None, None) => bail!("one of 'link' or 'open' is required"),
                };
                BinAction::ConditionalBundle { bundle_id, then }
            }
            Self::HabitChanger { old, new } => BinAction::HabitChanger {
                old: checked_name(old)?,
                new,
            },
        };
        Ok(action)
    }
}

/// Use `name` if given, otherwise the file stem of `path`.
fn bin_name(name: Option<String>, path: &Path) -> Result<String> {
    match name {
        Some(name) => checked_name(name),
        None => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("cannot derive a name from '{}'", path.display()))?;
            checked_name(stem.to_string())
        }
    }
}

/// Reject names that would not land directly inside `bin/`.
fn checked_name(name: String) -> Result<String> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0')
    {
        bail!("invalid bin name {name:?}");
    }
    Ok(name)
}

/// Parse manifest text into bin actions, preserving order.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or an entry is invalid. The
/// error names the 1-based entry index.
pub fn parse(content: &str) -> Result<Vec<BinAction>> {
    let file: ManifestFile = toml::from_str(content).context("Failed to parse manifest")?;
    convert(file)
}

/// Load the manifest at `path`. A missing file yields an empty manifest.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an entry is invalid.
pub fn load(path: &Path) -> Result<Vec<BinAction>> {
    let file: ManifestFile = toml_loader::load_config(path)?;
    convert(file).with_context(|| format!("in {}", path.display()))
}

fn convert(file: ManifestFile) -> Result<Vec<BinAction>> {
    file.bin
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .into_action()
                .with_context(|| format!("[[bin]] entry {}", i + 1))
        })
        .collect()
}
