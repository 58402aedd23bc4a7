//! Conflict-checked, ordered set of file actions for one run.
use std::collections::HashSet;
use std::path::PathBuf;

use super::actions::BinAction;
use super::bundle::BundleLocator;
use super::context::InstallContext;
use super::files::FileAction;
use crate::error::PlanError;
use crate::logging::Log;

/// File actions in manifest order, with unique destinations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<FileAction>,
    destinations: HashSet<PathBuf>,
}

impl Plan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan every manifest item in order.
    ///
    /// Items whose dependency is unavailable are logged and skipped; any
    /// other planning error aborts. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`PlanError`], including
    /// [`PlanError::DuplicateDestination`] when two items write the same file.
    pub fn build(
        manifest: &[BinAction],
        ctx: &InstallContext,
        locator: &dyn BundleLocator,
        log: &dyn Log,
    ) -> Result<Self, PlanError> {
        let mut plan = Self::new();
        for item in manifest {
            match item.get_plan(ctx, locator) {
                Ok(actions) => {
                    for action in actions {
                        plan.push(action)?;
                    }
                }
                Err(e) if e.is_recoverable() => log.warn(&e.to_string()),
                Err(e) => return Err(e),
            }
        }
        Ok(plan)
    }

    /// Append an action, rejecting a destination that is already planned.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DuplicateDestination`] on a collision.
    pub fn push(&mut self, action: FileAction) -> Result<(), PlanError> {
        let destination = action.destination().to_path_buf();
        if self.destinations.contains(&destination) {
            return Err(PlanError::DuplicateDestination { path: destination });
        }
        self.destinations.insert(destination);
        self.actions.push(action);
        Ok(())
    }

    /// Fail if any destination already exists on disk.
    ///
    /// Paths in `pending_removal` are treated as free; a dry run passes the
    /// files the clear phase would have deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DestinationOccupied`] for the first occupied path.
    pub fn ensure_destinations_free(
        &self,
        pending_removal: &HashSet<PathBuf>,
    ) -> Result<(), PlanError> {
        for action in &self.actions {
            let path = action.destination();
            if pending_removal.contains(path) {
                continue;
            }
            if path.symlink_metadata().is_ok() {
                return Err(PlanError::DestinationOccupied {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// Number of planned actions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing is planned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate actions in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileAction> {
        self.actions.iter()
    }
}

impl IntoIterator for Plan {
    type Item = FileAction;
    type IntoIter = std::vec::IntoIter<FileAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a FileAction;
    type IntoIter = std::slice::Iter<'a, FileAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::BundleError;
    use crate::install::actions::{BundleUse, Launch};
    use crate::install::bundle::MockBundleLocator;
    use crate::logging::test_helpers::RecordingLog;

    fn ctx() -> InstallContext {
        InstallContext::new(
            "/nonexistent/r",
            "/nonexistent/r/bin",
            "/nonexistent/r/venv/bin/python",
        )
    }

    fn link(target: &str, name: &str) -> BinAction {
        BinAction::Symlink {
            target: PathBuf::from(target),
            name: name.to_string(),
        }
    }

    fn absent_bundles() -> MockBundleLocator {
        let mut locator = MockBundleLocator::new();
        locator.expect_locate().returning(|id| {
            Err(BundleError::NotFound {
                bundle_id: id.to_string(),
            })
        });
        locator
    }

    #[test]
    fn build_preserves_manifest_order() {
        let manifest = vec![
            link("src/b.sh", "b"),
            link("src/a.sh", "a"),
            BinAction::HabitChanger {
                old: "c".to_string(),
                new: "d".to_string(),
            },
        ];
        let plan =
            Plan::build(&manifest, &ctx(), &absent_bundles(), &RecordingLog::default()).unwrap();
        let names: Vec<_> = plan
            .iter()
            .map(|a| a.destination().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_destination_is_fatal() {
        let manifest = vec![
            link("src/git-zip.sh", "git-zip"),
            BinAction::ScriptLauncher {
                name: "git-zip".to_string(),
                launch: Launch::OpenBundle("x".to_string()),
            },
        ];
        let log = RecordingLog::default();
        let err = Plan::build(&manifest, &ctx(), &absent_bundles(), &log).unwrap_err();
        assert!(
            matches!(&err, PlanError::DuplicateDestination { path }
                if path.ends_with("bin/git-zip")),
            "{err}"
        );
    }

    #[test]
    fn missing_bundle_is_skipped_with_warning() {
        let manifest = vec![
            BinAction::ConditionalBundle {
                bundle_id: "com.example.absent".to_string(),
                then: BundleUse::Open {
                    name: "absent".to_string(),
                },
            },
            link("src/a.sh", "a"),
        ];
        let log = RecordingLog::default();
        let plan = Plan::build(&manifest, &ctx(), &absent_bundles(), &log).unwrap();
        assert_eq!(plan.len(), 1);
        let warned = log.at("warn");
        assert_eq!(warned.len(), 1);
        assert!(warned[0].contains("com.example.absent"));
    }

    #[test]
    fn ambiguous_bundle_is_skipped_too() {
        let mut locator = MockBundleLocator::new();
        locator.expect_locate().returning(|id| {
            Err(BundleError::Ambiguous {
                bundle_id: id.to_string(),
                matches: vec![PathBuf::from("/A.app"), PathBuf::from("/B.app")],
            })
        });
        let manifest = vec![BinAction::ConditionalBundle {
            bundle_id: "com.example.twice".to_string(),
            then: BundleUse::Open {
                name: "twice".to_string(),
            },
        }];
        let plan = Plan::build(&manifest, &ctx(), &locator, &RecordingLog::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn occupied_destination_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("taken");
        std::fs::write(&taken, "mine").unwrap();
        let mut plan = Plan::new();
        plan.push(FileAction::ScriptFile {
            path: taken.clone(),
            contents: String::new(),
        })
        .unwrap();
        let err = plan.ensure_destinations_free(&HashSet::new()).unwrap_err();
        assert!(matches!(err, PlanError::DestinationOccupied { .. }));

        let pending: HashSet<PathBuf> = [taken].into_iter().collect();
        assert!(plan.ensure_destinations_free(&pending).is_ok());
    }

    #[test]
    fn dangling_symlink_counts_as_occupied() {
        let dir = tempfile::tempdir().unwrap();
        let dangling = dir.path().join("dangling");
        std::os::unix::fs::symlink("/nonexistent/target", &dangling).unwrap();
        let mut plan = Plan::new();
        plan.push(FileAction::Symlink {
            path: dangling,
            target: PathBuf::from("x"),
        })
        .unwrap();
        assert!(plan.ensure_destinations_free(&HashSet::new()).is_err());
    }
}
