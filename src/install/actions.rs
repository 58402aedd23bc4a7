//! Declarative bin actions and their planning.
use anyhow::Context as _;
use std::path::{Component, Path, PathBuf};

use super::bundle::BundleLocator;
use super::context::InstallContext;
use super::files::FileAction;
use super::script::{Token, command_line, habit_changer_script, sh_script};
use crate::error::PlanError;

/// Launch services command used by opener scripts.
pub const OPEN: &str = "/usr/bin/open";

/// What a generated launcher script runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Run a script with the environment's interpreter and fixed leading arguments.
    Python {
        /// Script path, relative to the repository root unless absolute.
        script: PathBuf,
        /// Arguments placed before the caller's arguments.
        args: Vec<String>,
    },
    /// Open an application by path.
    OpenPath(PathBuf),
    /// Open an application by bundle identifier.
    OpenBundle(String),
}

impl Launch {
    fn command(&self, ctx: &InstallContext) -> Result<String, PlanError> {
        let line = match self {
            Self::Python { script, args } => {
                let interpreter = utf8(&ctx.interpreter)?;
                let script = ctx.resolve(script);
                let script = utf8(&script)?;
                let mut tokens = vec![
                    Token::Word("exec"),
                    Token::Word(interpreter),
                    Token::Word(script),
                ];
                tokens.extend(args.iter().map(|a| Token::Word(a)));
                tokens.push(Token::AllArgs);
                command_line(&tokens)
            }
            Self::OpenPath(path) => command_line(&[
                Token::Word("exec"),
                Token::Word(OPEN),
                Token::Word("-a"),
                Token::Word(utf8(path)?),
                Token::AllArgs,
            ]),
            Self::OpenBundle(bundle_id) => command_line(&[
                Token::Word("exec"),
                Token::Word(OPEN),
                Token::Word("-b"),
                Token::Word(bundle_id),
                Token::AllArgs,
            ]),
        };
        Ok(line)
    }
}

/// How a located application bundle is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleUse {
    /// Link to a file inside the bundle.
    Link {
        /// Path relative to the bundle directory.
        path: PathBuf,
        /// Link name; defaults to the file stem of `path`.
        name: Option<String>,
    },
    /// Generate an opener for the bundle's path.
    Open {
        /// Opener name.
        name: String,
    },
}

impl BundleUse {
    fn action_for(&self, bundle: &Path) -> Result<BinAction, PlanError> {
        let action = match self {
            Self::Link { path, name } => {
                let name = match name {
                    Some(name) => name.clone(),
                    None => path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .with_context(|| format!("cannot derive a name from '{}'", path.display()))?
                        .to_string(),
                };
                BinAction::Symlink {
                    target: bundle.join(path),
                    name,
                }
            }
            Self::Open { name } => BinAction::ScriptLauncher {
                name: name.clone(),
                launch: Launch::OpenPath(bundle.to_path_buf()),
            },
        };
        Ok(action)
    }
}

/// One desired entry in the generated `bin/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinAction {
    /// A `/bin/sh` launcher that `exec`s another program.
    ScriptLauncher {
        /// File name inside `bin/`.
        name: String,
        /// Program to run.
        launch: Launch,
    },
    /// An action that only applies when an application bundle is installed.
    ConditionalBundle {
        /// Bundle identifier to look up.
        bundle_id: String,
        /// What to do with the bundle once found.
        then: BundleUse,
    },
    /// A symbolic link.
    Symlink {
        /// Link target, relative to the repository root unless absolute.
        target: PathBuf,
        /// File name inside `bin/`.
        name: String,
    },
    /// A script reminding the user to stop using an old command.
    HabitChanger {
        /// The retired command name; also the file name inside `bin/`.
        old: String,
        /// The replacement command.
        new: String,
    },
}

impl BinAction {
    /// Turn this action into concrete file writes.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DependencyUnavailable`] when a required bundle is
    /// missing or ambiguous, and [`PlanError::Other`] for anything else.
    pub fn get_plan(
        &self,
        ctx: &InstallContext,
        locator: &dyn BundleLocator,
    ) -> Result<Vec<FileAction>, PlanError> {
        match self {
            Self::ScriptLauncher { name, launch } => Ok(vec![FileAction::ScriptFile {
                path: ctx.bin.join(name),
                contents: sh_script(&launch.command(ctx)?),
            }]),
            Self::ConditionalBundle { bundle_id, then } => {
                let bundle = locator.locate(bundle_id).map_err(|source| {
                    PlanError::DependencyUnavailable {
                        action: self.description(),
                        source,
                    }
                })?;
                then.action_for(&bundle)?.get_plan(ctx, locator)
            }
            Self::Symlink { target, name } => {
                let path = ctx.bin.join(name);
                let target = link_content(ctx, target);
                Ok(vec![FileAction::Symlink { path, target }])
            }
            Self::HabitChanger { old, new } => Ok(vec![FileAction::ScriptFile {
                path: ctx.bin.join(old),
                contents: habit_changer_script(old, new),
            }]),
        }
    }

    /// Human-readable description used in diagnostics.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::ScriptLauncher { name, launch } => match launch {
                Launch::Python { script, .. } => {
                    format!("launcher '{name}' for {}", script.display())
                }
                Launch::OpenPath(path) => format!("opener '{name}' for {}", path.display()),
                Launch::OpenBundle(id) => format!("opener '{name}' for bundle {id}"),
            },
            Self::ConditionalBundle { bundle_id, then } => match then {
                BundleUse::Link { path, .. } => {
                    format!("link to {} in bundle {bundle_id}", path.display())
                }
                BundleUse::Open { name } => format!("opener '{name}' for bundle {bundle_id}"),
            },
            Self::Symlink { target, name } => format!("link '{name}' to {}", target.display()),
            Self::HabitChanger { old, new } => format!("habit changer '{old}' -> '{new}'"),
        }
    }

    /// Name this action is expected to produce in `bin/`.
    #[must_use]
    pub fn name_hint(&self) -> &str {
        match self {
            Self::ScriptLauncher { name, .. } | Self::Symlink { name, .. } => name,
            Self::ConditionalBundle { then, .. } => match then {
                BundleUse::Link {
                    name: Some(name), ..
                }
                | BundleUse::Open { name } => name,
                BundleUse::Link { path, name: None } => {
                    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default()
                }
            },
            Self::HabitChanger { old, .. } => old,
        }
    }
}

fn utf8(path: &Path) -> Result<&str, PlanError> {
    path.to_str()
        .with_context(|| format!("non UTF-8 path: {}", path.display()))
        .map_err(PlanError::from)
}

/// Compute the stored content of a link in `bin/` pointing at `target`.
///
/// Targets that resolve inside the repository root become paths relative to
/// `bin/`; anything else is stored absolute.
fn link_content(ctx: &InstallContext, target: &Path) -> PathBuf {
    let target = resolve_lenient(&ctx.resolve(target));
    let root = resolve_lenient(&ctx.root);
    if target.starts_with(&root) {
        relative_path(&target, &resolve_lenient(&ctx.bin))
    } else {
        target
    }
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve symlinks in `path` as far as it exists, then append the rest.
#[must_use]
pub fn resolve_lenient(path: &Path) -> PathBuf {
    if let Ok(resolved) = dunce::canonicalize(path) {
        return resolved;
    }
    let normalized = normalize(path);
    let mut tail = Vec::new();
    let mut current = normalized.as_path();
    loop {
        if let Ok(mut base) = dunce::canonicalize(current) {
            for part in tail.iter().rev() {
                base.push(part);
            }
            return base;
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                current = parent;
            }
            _ => return normalized,
        }
    }
}

/// Express absolute `target` relative to absolute directory `base`.
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();
    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in target.iter().skip(common) {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::BundleError;
    use crate::install::bundle::MockBundleLocator;

    fn ctx() -> InstallContext {
        InstallContext::new(
            "/nonexistent/shelpers",
            "/nonexistent/shelpers/bin",
            "/nonexistent/shelpers/venv/bin/python",
        )
    }

    fn no_bundles() -> MockBundleLocator {
        let mut locator = MockBundleLocator::new();
        locator.expect_locate().never();
        locator
    }

    fn script_of(actions: &[FileAction]) -> &str {
        match &actions[0] {
            FileAction::ScriptFile { contents, .. } => contents,
            FileAction::Symlink { .. } => "",
        }
    }

    // -----------------------------------------------------------------------
    // ScriptLauncher
    // -----------------------------------------------------------------------

    #[test]
    fn python_launcher_script() {
        let action = BinAction::ScriptLauncher {
            name: "bm-my-docs".to_string(),
            launch: Launch::Python {
                script: PathBuf::from("src/open_bookmark.py"),
                args: vec!["my docs".to_string()],
            },
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].destination(), Path::new("/nonexistent/shelpers/bin/bm-my-docs"));
        insta::assert_snapshot!(script_of(&plan), @r#"
        #!/bin/sh
        exec /nonexistent/shelpers/venv/bin/python /nonexistent/shelpers/src/open_bookmark.py 'my docs' "$@"
        "#);
    }

    #[test]
    fn path_opener_script() {
        let action = BinAction::ScriptLauncher {
            name: "hex".to_string(),
            launch: Launch::OpenPath(PathBuf::from("/Applications/Hex Fiend.app")),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        insta::assert_snapshot!(script_of(&plan), @r#"
        #!/bin/sh
        exec /usr/bin/open -a '/Applications/Hex Fiend.app' "$@"
        "#);
    }

    #[test]
    fn bundle_opener_script() {
        let action = BinAction::ScriptLauncher {
            name: "vlc".to_string(),
            launch: Launch::OpenBundle("org.videolan.vlc".to_string()),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        insta::assert_snapshot!(script_of(&plan), @r#"
        #!/bin/sh
        exec /usr/bin/open -b org.videolan.vlc "$@"
        "#);
    }

    #[test]
    fn habit_changer_writes_old_name() {
        let action = BinAction::HabitChanger {
            old: "youtube-dl".to_string(),
            new: "yt-dlp".to_string(),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        assert_eq!(plan[0].destination(), Path::new("/nonexistent/shelpers/bin/youtube-dl"));
        assert!(script_of(&plan).contains("Use yt-dlp instead."));
    }

    // -----------------------------------------------------------------------
    // Symlink
    // -----------------------------------------------------------------------

    #[test]
    fn symlink_inside_root_is_relative() {
        let action = BinAction::Symlink {
            target: PathBuf::from("src/myip.sh"),
            name: "myip".to_string(),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        assert_eq!(
            plan,
            vec![FileAction::Symlink {
                path: PathBuf::from("/nonexistent/shelpers/bin/myip"),
                target: PathBuf::from("../src/myip.sh"),
            }]
        );
    }

    #[test]
    fn symlink_outside_root_is_absolute() {
        let action = BinAction::Symlink {
            target: PathBuf::from("/nonexistent/elsewhere/tool"),
            name: "tool".to_string(),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        assert_eq!(
            plan[0],
            FileAction::Symlink {
                path: PathBuf::from("/nonexistent/shelpers/bin/tool"),
                target: PathBuf::from("/nonexistent/elsewhere/tool"),
            }
        );
    }

    #[test]
    fn symlink_dotdot_escaping_root_is_absolute() {
        let action = BinAction::Symlink {
            target: PathBuf::from("../other/tool"),
            name: "tool".to_string(),
        };
        let plan = action.get_plan(&ctx(), &no_bundles()).unwrap();
        assert_eq!(
            plan[0],
            FileAction::Symlink {
                path: PathBuf::from("/nonexistent/shelpers/bin/tool"),
                target: PathBuf::from("/nonexistent/other/tool"),
            }
        );
    }

    // -----------------------------------------------------------------------
    // ConditionalBundle
    // -----------------------------------------------------------------------

    #[test]
    fn conditional_bundle_links_into_bundle() {
        let mut locator = MockBundleLocator::new();
        locator
            .expect_locate()
            .withf(|id| id == "com.microsoft.VSCode")
            .times(1)
            .returning(|_| Ok(PathBuf::from("/nonexistent/Apps/Code.app")));
        let action = BinAction::ConditionalBundle {
            bundle_id: "com.microsoft.VSCode".to_string(),
            then: BundleUse::Link {
                path: PathBuf::from("Contents/Resources/app/bin/code"),
                name: Some("vscode".to_string()),
            },
        };
        let plan = action.get_plan(&ctx(), &locator).unwrap();
        assert_eq!(
            plan,
            vec![FileAction::Symlink {
                path: PathBuf::from("/nonexistent/shelpers/bin/vscode"),
                target: PathBuf::from("/nonexistent/Apps/Code.app/Contents/Resources/app/bin/code"),
            }]
        );
    }

    #[test]
    fn conditional_bundle_link_name_defaults_to_stem() {
        let mut locator = MockBundleLocator::new();
        locator
            .expect_locate()
            .returning(|_| Ok(PathBuf::from("/nonexistent/Apps/SourceTree.app")));
        let action = BinAction::ConditionalBundle {
            bundle_id: "com.torusknot.SourceTreeNotMAS".to_string(),
            then: BundleUse::Link {
                path: PathBuf::from("Contents/Resources/stree"),
                name: None,
            },
        };
        assert_eq!(action.name_hint(), "stree");
        let plan = action.get_plan(&ctx(), &locator).unwrap();
        assert_eq!(plan[0].destination(), Path::new("/nonexistent/shelpers/bin/stree"));
    }

    #[test]
    fn conditional_bundle_opener_uses_bundle_path() {
        let mut locator = MockBundleLocator::new();
        locator
            .expect_locate()
            .returning(|_| Ok(PathBuf::from("/Applications/Adobe Photoshop.app")));
        let action = BinAction::ConditionalBundle {
            bundle_id: "com.adobe.Photoshop".to_string(),
            then: BundleUse::Open {
                name: "photoshop".to_string(),
            },
        };
        let plan = action.get_plan(&ctx(), &locator).unwrap();
        insta::assert_snapshot!(script_of(&plan), @r#"
        #!/bin/sh
        exec /usr/bin/open -a '/Applications/Adobe Photoshop.app' "$@"
        "#);
    }

    #[test]
    fn missing_bundle_is_recoverable() {
        let mut locator = MockBundleLocator::new();
        locator.expect_locate().returning(|id| {
            Err(BundleError::NotFound {
                bundle_id: id.to_string(),
            })
        });
        let action = BinAction::ConditionalBundle {
            bundle_id: "com.example.absent".to_string(),
            then: BundleUse::Open {
                name: "absent".to_string(),
            },
        };
        let err = action.get_plan(&ctx(), &locator).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("com.example.absent"));
    }

    // -----------------------------------------------------------------------
    // Path helpers
    // -----------------------------------------------------------------------

    #[test]
    fn relative_path_walks_up_and_down() {
        assert_eq!(
            relative_path(Path::new("/r/src/a.sh"), Path::new("/r/bin")),
            PathBuf::from("../src/a.sh")
        );
        assert_eq!(
            relative_path(Path::new("/r/bin/x"), Path::new("/r/bin")),
            PathBuf::from("x")
        );
        assert_eq!(relative_path(Path::new("/r"), Path::new("/r")), PathBuf::from("."));
    }

    #[test]
    fn resolve_lenient_follows_existing_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();
        let resolved = resolve_lenient(&dir.path().join("alias/missing/file"));
        assert_eq!(
            resolved,
            dunce::canonicalize(&real).unwrap().join("missing/file")
        );
    }
}
