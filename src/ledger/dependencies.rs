// src/ledger/dependencies.rs

//! Which files each test file touched during its most recent run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::watch::providers::ProviderSet;

/// Dependency record for one test file.
///
/// `dependencies` is never empty and always starts with the test file's own
/// canonical path(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDependency {
    pub file: String,
    pub dependencies: Vec<String>,
}

impl TestDependency {
    pub fn contains(&self, path: &str) -> bool {
        self.dependencies.iter().any(|d| d == path)
    }
}

/// Per-test-file dependency sets, replaced wholesale on every report.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    providers: ProviderSet,
    entries: BTreeMap<String, TestDependency>,
}

impl DependencyTracker {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            entries: BTreeMap::new(),
        }
    }

    /// Replace the dependency set of `file`.
    ///
    /// An empty `dependencies` list deletes the entry. Otherwise the file's
    /// canonical path(s) are prepended when missing and duplicates dropped.
    pub fn update(&mut self, file: &str, dependencies: Vec<String>) {
        if dependencies.is_empty() {
            if self.entries.remove(file).is_some() {
                debug!(file, "dropped dependency entry");
            }
            return;
        }

        let mut ordered: Vec<String> = Vec::with_capacity(dependencies.len() + 1);
        for canonical in self.providers.resolve_test_file(file) {
            if !dependencies.contains(&canonical) && !ordered.contains(&canonical) {
                ordered.push(canonical);
            }
        }
        for dep in dependencies {
            if !ordered.contains(&dep) {
                ordered.push(dep);
            }
        }

        debug!(file, dependencies = ?ordered, "updated dependency entry");
        self.entries.insert(
            file.to_string(),
            TestDependency {
                file: file.to_string(),
                dependencies: ordered,
            },
        );
    }

    pub fn remove(&mut self, file: &str) {
        self.update(file, Vec::new());
    }

    /// All tracked test files whose dependency set contains `path`.
    pub fn dependents_of(&self, path: &str) -> BTreeSet<String> {
        self.entries
            .values()
            .filter(|entry| entry.contains(path))
            .map(|entry| entry.file.clone())
            .collect()
    }

    pub fn get(&self, file: &str) -> Option<&TestDependency> {
        self.entries.get(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
