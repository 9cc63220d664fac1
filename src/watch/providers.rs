// src/watch/providers.rs

//! Change-ignore providers.
//!
//! A provider knows about a build step sitting between the sources the user
//! edits and the files the test engine executes (e.g. a TypeScript compiler
//! writing `build/` from `src/`). It can veto changes to its own output and
//! map an executed test file back to the file the user actually edits.

use std::fmt;
use std::sync::Arc;

use crate::config::{ConfigFile, RewriteConfig};

pub trait ChangeIgnoreProvider: Send + Sync {
    /// True if a change to `rel_path` must never trigger a rerun.
    fn ignore_change(&self, rel_path: &str) -> bool;

    /// Canonical (user-edited) path for an executed test file.
    fn resolve_test_file(&self, test_file: &str) -> String;
}

/// Provider built from a `[[rewrite]]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteProvider {
    source: String,
    compiled: String,
}

impl RewriteProvider {
    pub fn new(source: impl Into<String>, compiled: impl Into<String>) -> Self {
        Self {
            source: dir_prefix(source.into()),
            compiled: dir_prefix(compiled.into()),
        }
    }
}

impl From<&RewriteConfig> for RewriteProvider {
    fn from(cfg: &RewriteConfig) -> Self {
        Self::new(cfg.source.clone(), cfg.compiled.clone())
    }
}

fn dir_prefix(mut dir: String) -> String {
    while let Some(rest) = dir.strip_prefix("./") {
        dir = rest.to_string();
    }
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

impl ChangeIgnoreProvider for RewriteProvider {
    fn ignore_change(&self, rel_path: &str) -> bool {
        rel_path.starts_with(&self.compiled)
    }

    fn resolve_test_file(&self, test_file: &str) -> String {
        match test_file.strip_prefix(&self.compiled) {
            Some(rest) => format!("{}{}", self.source, rest),
            None => test_file.to_string(),
        }
    }
}

/// The registered providers, in registration order.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn ChangeIgnoreProvider>>,
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSet")
            .field("len", &self.providers.len())
            .finish()
    }
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut set = Self::new();
        for rewrite in cfg.rewrites() {
            set.register(Arc::new(RewriteProvider::from(rewrite)));
        }
        set
    }

    pub fn register(&mut self, provider: Arc<dyn ChangeIgnoreProvider>) {
        self.providers.push(provider);
    }

    pub fn with(mut self, provider: impl ChangeIgnoreProvider + 'static) -> Self {
        self.register(Arc::new(provider));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// True if any provider vetoes this change.
    pub fn ignores(&self, rel_path: &str) -> bool {
        self.providers.iter().any(|p| p.ignore_change(rel_path))
    }

    /// Canonical paths for `test_file`, one per provider.
    ///
    /// With no providers registered the test file is its own canonical path.
    pub fn resolve_test_file(&self, test_file: &str) -> Vec<String> {
        if self.providers.is_empty() {
            return vec![test_file.to_string()];
        }
        self.providers
            .iter()
            .map(|p| p.resolve_test_file(test_file))
            .collect()
    }
}
