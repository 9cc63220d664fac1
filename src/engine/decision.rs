// src/engine/decision.rs

//! Rerun decision for one debounced batch of dirty paths.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::ledger::{DependencyTracker, ExclusivityTracker, FailureLedger, TouchedFileLedger};
use crate::types::{ChangeKind, DirtyPath, RunPlan};
use crate::watch::{IgnoreMatcher, PathClassifier, ProviderSet};

/// Everything the decision reads or updates.
pub struct DecisionInputs<'a> {
    pub classifier: &'a dyn PathClassifier,
    pub ignore: &'a IgnoreMatcher,
    pub providers: &'a ProviderSet,
    pub touched: &'a mut TouchedFileLedger,
    pub dependencies: &'a mut DependencyTracker,
    pub exclusivity: &'a mut ExclusivityTracker,
    pub failures: &'a mut FailureLedger,
}

#[derive(Debug, Default)]
struct Partition {
    test_changed: BTreeSet<String>,
    test_unlinked: BTreeSet<String>,
    helper_or_source: BTreeSet<String>,
}

/// Decide what to run for `batch`.
///
/// 1. Drop self-inflicted, temporary, provider-ignored and glob-ignored paths.
/// 2. Drop paths the classifier marks as ignored by the watcher.
/// 3. Split the rest into changed tests, deleted tests and other files.
/// 4. Retire deleted tests from every ledger.
/// 5. Only deletions: nothing to run.
/// 6. Only test changes: run exactly those.
/// 7. Otherwise run the changed tests plus every dependent of the other
///    files, or everything if any of those files has no known dependent.
pub fn decide(inputs: DecisionInputs<'_>, batch: Vec<DirtyPath>) -> RunPlan {
    let DecisionInputs {
        classifier,
        ignore,
        providers,
        touched,
        dependencies,
        exclusivity,
        failures,
    } = inputs;

    let mut partition = Partition::default();

    for dirty in batch {
        let path = dirty.path.as_str();
        if touched.consume_touched(path)
            || touched.is_temporary(path)
            || providers.ignores(path)
            || ignore.is_ignored(path)
        {
            debug!(path, "change ignored");
            continue;
        }

        let class = classifier.classify(path);
        if class.is_ignored_by_watcher {
            debug!(path, "change ignored by watcher config");
            continue;
        }

        match (class.is_test, dirty.kind) {
            (true, ChangeKind::Changed) => partition.test_changed.insert(dirty.path),
            (true, ChangeKind::Deleted) => partition.test_unlinked.insert(dirty.path),
            (false, _) => partition.helper_or_source.insert(dirty.path),
        };
    }

    if !partition.test_unlinked.is_empty() {
        for file in &partition.test_unlinked {
            dependencies.remove(file);
            exclusivity.mark_exclusive(file, false);
        }
        failures.prune(&partition.test_unlinked);
        info!(files = ?partition.test_unlinked, "test files deleted; retired from tracking");
    }

    if partition.test_changed.is_empty() && partition.helper_or_source.is_empty() {
        return RunPlan::Skip;
    }

    if partition.helper_or_source.is_empty() {
        return RunPlan::Files(partition.test_changed);
    }

    let mut files = partition.test_changed;
    for source in &partition.helper_or_source {
        let dependents = dependencies.dependents_of(source);
        if dependents.is_empty() {
            info!(path = %source, "no known dependents; rerunning all tests");
            return RunPlan::All;
        }
        debug!(path = %source, ?dependents, "source change maps to test files");
        files.extend(dependents);
    }

    RunPlan::Files(files)
}
