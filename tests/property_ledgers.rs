// tests/property_ledgers.rs

use std::collections::BTreeSet;

use proptest::prelude::*;
use watchtest::engine::RerunCore;
use watchtest::exec::TelemetryEvent;
use watchtest::ledger::{ExclusivityTracker, FailureLedger};
use watchtest::types::{DirtyPath, RunPlan};
use watchtest_test_utils::builders::CoreBuilder;

fn test_file() -> impl Strategy<Value = String> {
    (0..6usize).prop_map(|i| format!("test/t{i}.js"))
}

fn source_file() -> impl Strategy<Value = String> {
    (0..6usize).prop_map(|i| format!("src/s{i}.js"))
}

// Each tracked test depends on a subset of the source files.
fn tracked_core() -> impl Strategy<Value = (RerunCore, Vec<(String, Vec<String>)>)> {
    proptest::collection::vec(
        (test_file(), proptest::collection::vec(source_file(), 1..4)),
        0..6,
    )
    .prop_map(|entries| {
        let mut core = CoreBuilder::new().build();
        for (test, deps) in &entries {
            core.apply_telemetry(TelemetryEvent::accessed(test.clone(), deps.clone()));
        }
        (core, entries)
    })
}

proptest! {
    #[test]
    fn only_deleted_tests_never_dispatch(
        tests in proptest::collection::vec(test_file(), 1..6),
    ) {
        let mut core = CoreBuilder::new().build();
        for t in &tests {
            core.apply_telemetry(TelemetryEvent::accessed(t.clone(), vec!["src/s0.js".to_string()]));
            core.apply_telemetry(TelemetryEvent::test_failed(t.clone()));
        }

        let batch = tests.iter().map(|t| DirtyPath::deleted(t.clone())).collect();
        prop_assert_eq!(core.plan_changes(batch), RunPlan::Skip);
        prop_assert!(core.dependencies().is_empty());
        prop_assert!(core.failures().is_empty());
    }

    #[test]
    fn source_changes_select_exactly_known_dependents(
        (mut core, entries) in tracked_core(),
        changed in proptest::collection::btree_set(source_file(), 1..4),
    ) {
        let batch = changed.iter().map(|s| DirtyPath::changed(s.clone())).collect();
        let plan = core.plan_changes(batch);

        // Latest update per test file wins.
        let mut latest = std::collections::BTreeMap::new();
        for (test, deps) in entries {
            latest.insert(test, deps);
        }
        let untraceable = changed
            .iter()
            .any(|s| !latest.values().any(|deps| deps.contains(s)));

        if untraceable {
            prop_assert_eq!(plan, RunPlan::All);
        } else {
            let expected: BTreeSet<String> = latest
                .iter()
                .filter(|(_, deps)| changed.iter().any(|s| deps.contains(s)))
                .map(|(t, _)| t.clone())
                .collect();
            prop_assert_eq!(plan, RunPlan::Files(expected));
        }
    }

    #[test]
    fn reconcile_result_always_covers_request_and_exclusive_set(
        exclusive in proptest::collection::btree_set(test_file(), 0..4),
        requested in proptest::collection::btree_set(test_file(), 0..4),
    ) {
        let mut tracker = ExclusivityTracker::new();
        for f in &exclusive {
            tracker.mark_exclusive(f, true);
        }

        let reconciled = tracker.reconcile(requested.clone());
        prop_assert!(requested.is_subset(&reconciled.files));
        if !requested.is_empty() {
            prop_assert!(exclusive.is_subset(&reconciled.files));
        }
        prop_assert_eq!(
            reconciled.run_only_exclusive,
            !requested.is_empty() && !exclusive.is_subset(&requested)
        );
    }

    #[test]
    fn pruned_files_never_count_toward_previous_failures(
        failures in proptest::collection::vec((test_file(), 1..4u64), 0..10),
        pruned in proptest::collection::btree_set(test_file(), 0..4),
    ) {
        let mut ledger = FailureLedger::new();
        for (file, generation) in &failures {
            ledger.record(file, *generation);
        }
        ledger.prune(&pruned);

        prop_assert!(ledger.records().iter().all(|r| !pruned.contains(&r.file)));
        let expected = failures
            .iter()
            .filter(|(file, _)| !pruned.contains(file))
            .count() as u64;
        prop_assert_eq!(ledger.sum_before(u64::MAX), expected);
    }
}
