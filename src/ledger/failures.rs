// src/ledger/failures.rs

use std::collections::BTreeSet;

/// Failures recorded for one test file.
///
/// `generation` is the run in which the streak started being tracked; later
/// failures bump `count` without moving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub file: String,
    pub generation: u64,
    pub count: u64,
}

/// Outstanding failures per test file, keyed by run generation.
#[derive(Debug, Default)]
pub struct FailureLedger {
    records: Vec<FailureRecord>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, file: &str, generation: u64) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.file == file) {
            existing.count += 1;
            return;
        }
        self.records.push(FailureRecord {
            file: file.to_string(),
            generation,
            count: 1,
        });
    }

    /// Drop every record for the given files, whatever their generation.
    pub fn prune(&mut self, files: &BTreeSet<String>) {
        self.records.retain(|r| !files.contains(&r.file));
    }

    /// Sum of counts over records that started before `generation`.
    pub fn sum_before(&self, generation: u64) -> u64 {
        self.records
            .iter()
            .filter(|r| r.generation < generation)
            .map(|r| r.count)
            .sum()
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
