//! Application bundle lookup by bundle identifier.
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::BundleError;
use crate::exec::Executor;

/// Spotlight command-line search tool.
pub const MDFIND: &str = "/usr/bin/mdfind";

/// Finds installed application bundles.
#[cfg_attr(test, mockall::automock)]
pub trait BundleLocator {
    /// Return the path of the single application with `bundle_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::NotFound`] when nothing matches,
    /// [`BundleError::Ambiguous`] when several bundles match, and
    /// [`BundleError::Lookup`] when the search itself fails.
    fn locate(&self, bundle_id: &str) -> Result<PathBuf, BundleError>;
}

/// Build the Spotlight query for a bundle identifier.
///
/// Quotes, `*`, `?` and backslashes are escaped so the identifier is
/// matched literally.
#[must_use]
pub fn mdfind_query(bundle_id: &str) -> String {
    let mut escaped = String::with_capacity(bundle_id.len());
    for c in bundle_id.chars() {
        if matches!(c, '"' | '\'' | '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("kMDItemCFBundleIdentifier=\"{escaped}\"")
}

/// [`BundleLocator`] backed by `mdfind`, memoising results for one run.
#[derive(Debug)]
pub struct MdfindLocator {
    executor: Arc<dyn Executor>,
    cache: RefCell<HashMap<String, Vec<PathBuf>>>,
}

impl MdfindLocator {
    /// Create a locator with an empty cache.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn search(&self, bundle_id: &str) -> Result<Vec<PathBuf>, BundleError> {
        if let Some(hit) = self.cache.borrow().get(bundle_id) {
            return Ok(hit.clone());
        }
        let query = mdfind_query(bundle_id);
        let result = self
            .executor
            .run(MDFIND, &["-0", &query])
            .map_err(|e| BundleError::Lookup {
                bundle_id: bundle_id.to_string(),
                reason: format!("{e:#}"),
            })?;
        let matches: Vec<PathBuf> = result
            .stdout
            .split('\0')
            .filter(|m| !m.is_empty())
            .map(PathBuf::from)
            .collect();
        self.cache
            .borrow_mut()
            .insert(bundle_id.to_string(), matches.clone());
        Ok(matches)
    }
}

impl BundleLocator for MdfindLocator {
    fn locate(&self, bundle_id: &str) -> Result<PathBuf, BundleError> {
        let mut matches = self.search(bundle_id)?;
        match matches.len() {
            0 => Err(BundleError::NotFound {
                bundle_id: bundle_id.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(BundleError::Ambiguous {
                bundle_id: bundle_id.to_string(),
                matches,
            }),
        }
    }
}
