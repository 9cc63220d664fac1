// src/ledger/touched.rs

use std::collections::HashSet;

use tracing::debug;

/// Changes the test engine caused itself.
///
/// - touched files are suppressed once, the next time they show up dirty,
///   and forgotten when the next run is dispatched;
/// - temporary files are suppressed until the ledger is cleared.
#[derive(Debug, Default)]
pub struct TouchedFileLedger {
    touched: HashSet<String>,
    temporary: HashSet<String>,
}

impl TouchedFileLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_touched<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.touched.extend(paths);
    }

    pub fn record_temporary<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.temporary.extend(paths);
    }

    /// Returns true (and forgets the entry) if `path` was touched by a run.
    pub fn consume_touched(&mut self, path: &str) -> bool {
        let hit = self.touched.remove(path);
        if hit {
            debug!(path, "suppressed self-inflicted change");
        }
        hit
    }

    pub fn is_temporary(&self, path: &str) -> bool {
        self.temporary.contains(path)
    }

    /// Forget every touched entry that never reappeared as a dirty path.
    pub fn clear_touched(&mut self) {
        if !self.touched.is_empty() {
            debug!(stale = self.touched.len(), "dropping unconsumed touched files");
            self.touched.clear();
        }
    }

    pub fn clear_temporary(&mut self) {
        self.temporary.clear();
    }

    pub fn touched_len(&self) -> usize {
        self.touched.len()
    }

    pub fn temporary_len(&self) -> usize {
        self.temporary.len()
    }
}
