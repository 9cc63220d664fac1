// src/ledger/exclusivity.rs

use std::collections::BTreeSet;

use tracing::debug;

/// Effective run set after folding in exclusive files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub files: BTreeSet<String>,
    pub run_only_exclusive: bool,
}

/// Test files whose last execution selected fewer tests than they declare,
/// i.e. files using `.only`-style exclusive selection.
#[derive(Debug, Default)]
pub struct ExclusivityTracker {
    exclusive: BTreeSet<String>,
}

impl ExclusivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_exclusive(&mut self, file: &str, has_exclusive_subset: bool) {
        let changed = if has_exclusive_subset {
            self.exclusive.insert(file.to_string())
        } else {
            self.exclusive.remove(file)
        };
        if changed {
            debug!(file, exclusive = has_exclusive_subset, "exclusive set changed");
        }
    }

    pub fn is_exclusive(&self, file: &str) -> bool {
        self.exclusive.contains(file)
    }

    pub fn exclusive_files(&self) -> &BTreeSet<String> {
        &self.exclusive
    }

    /// Fold the exclusive set into a requested run.
    ///
    /// A non-empty request that misses some exclusive file is widened to
    /// include every exclusive file, and the engine is told to run those in
    /// exclusive mode. An empty request ("run everything") or one that
    /// already covers the exclusive set passes through unchanged.
    pub fn reconcile(&self, requested: BTreeSet<String>) -> Reconciled {
        if requested.is_empty() || self.exclusive.is_subset(&requested) {
            return Reconciled {
                files: requested,
                run_only_exclusive: false,
            };
        }

        let mut files = self.exclusive.clone();
        files.extend(requested);
        Reconciled {
            files,
            run_only_exclusive: true,
        }
    }
}
