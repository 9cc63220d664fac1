// src/watch/classifier.rs

//! Path classification: is a changed path a test file, and should the
//! watcher care about it at all?

use std::fmt;

use globset::GlobSet;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::types::Classification;
use crate::watch::patterns::build_globset;

/// Classifies project-relative paths.
///
/// Implementations must be pure lookups; the rerun engine never overrides
/// their answer.
pub trait PathClassifier: Send + Sync {
    fn classify(&self, rel_path: &str) -> Classification;
}

impl<F> PathClassifier for F
where
    F: Fn(&str) -> Classification + Send + Sync,
{
    fn classify(&self, rel_path: &str) -> Classification {
        self(rel_path)
    }
}

/// Classifier driven by the `[tests]` globs of the config.
pub struct GlobClassifier {
    files: GlobSet,
    helpers: GlobSet,
    ignored_by_watcher: GlobSet,
}

impl fmt::Debug for GlobClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobClassifier").finish_non_exhaustive()
    }
}

impl GlobClassifier {
    pub fn new<S: AsRef<str>>(files: &[S], helpers: &[S], ignored_by_watcher: &[S]) -> Result<Self> {
        Ok(Self {
            files: build_globset(files)?,
            helpers: build_globset(helpers)?,
            ignored_by_watcher: build_globset(ignored_by_watcher)?,
        })
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let tests = cfg.tests();
        Self::new(&tests.files, &tests.helpers, &tests.ignored_by_watcher)
    }
}

impl PathClassifier for GlobClassifier {
    fn classify(&self, rel_path: &str) -> Classification {
        Classification {
            is_test: self.files.is_match(rel_path) && !self.helpers.is_match(rel_path),
            is_ignored_by_watcher: self.ignored_by_watcher.is_match(rel_path),
        }
    }
}
