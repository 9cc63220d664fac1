// src/watch/patterns.rs

//! Glob-based matchers shared by the classifier, the ignore list and the
//! command-line file filter.
//!
//! All matchers work on project-relative paths with forward slashes, e.g.
//! `"src/foo/bar.js"`.

use std::collections::BTreeSet;
use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::errors::{Result, WatchtestError};

/// Ignore globs applied to every project regardless of configuration.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/.nyc_output/**",
    "**/coverage/**",
];

/// Build a GlobSet from simple string patterns.
pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.as_ref();
        let glob = Glob::new(pat).map_err(|source| WatchtestError::InvalidGlob {
            pattern: pat.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| WatchtestError::InvalidGlob {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        source,
    })
}

/// Composed ignore matcher: built-in defaults plus `[watch].ignore`.
#[derive(Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreMatcher")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreMatcher {
    /// Defaults followed by `extra`.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        let patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().map(|p| p.as_ref().to_string()))
            .collect();
        let set = build_globset(&patterns)?;
        Ok(Self { set, patterns })
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(&cfg.watch().ignore)
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Filename filters given on the command line.
///
/// An empty filter accepts everything.
#[derive(Clone)]
pub struct FileFilter {
    set: Option<GlobSet>,
    patterns: Vec<String>,
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            set: None,
            patterns: Vec::new(),
        }
    }
}

impl FileFilter {
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let set = build_globset(&patterns)?;
        Ok(Self {
            set: Some(set),
            patterns,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(rel_path),
            None => true,
        }
    }

    /// Keep only the files accepted by the filter.
    pub fn narrow(&self, files: BTreeSet<String>) -> BTreeSet<String> {
        if self.is_empty() {
            return files;
        }
        files.into_iter().filter(|f| self.matches(f)).collect()
    }
}
