use std::collections::{BTreeSet, HashMap};

/// What happened to a path reported by the filesystem watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Changed,
    Deleted,
}

/// A project-relative path reported changed or deleted since the last
/// processed batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirtyPath {
    pub path: String,
    pub kind: ChangeKind,
}

impl DirtyPath {
    pub fn changed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Changed,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Deleted,
        }
    }
}

/// Result of classifying a project-relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_test: bool,
    pub is_ignored_by_watcher: bool,
}

/// Which test files a run should cover.
///
/// `All` means "no explicit file list"; the execution engine decides what
/// the full suite is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPlan {
    /// Nothing to do for this batch.
    Skip,
    /// Run every test file.
    All,
    /// Run exactly these test files.
    Files(BTreeSet<String>),
}

impl RunPlan {
    /// Build a plan from an explicit file set. An empty set means "all".
    pub fn from_files(files: BTreeSet<String>) -> Self {
        if files.is_empty() {
            RunPlan::All
        } else {
            RunPlan::Files(files)
        }
    }

    /// Files for the instruction; empty for `All` and `Skip`.
    pub fn into_files(self) -> BTreeSet<String> {
        match self {
            RunPlan::Files(files) => files,
            RunPlan::All | RunPlan::Skip => BTreeSet::new(),
        }
    }
}

/// The immutable contract handed to the execution engine for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInstruction {
    /// Test files to run; empty means the whole suite.
    pub files: BTreeSet<String>,
    pub is_first_run: bool,
    /// Outstanding failures recorded by earlier runs.
    pub previous_failure_count: u64,
    /// Files in the exclusive set must rerun their exclusive tests only.
    pub run_only_exclusive: bool,
    pub update_snapshots: bool,
    pub generation: u64,
    /// Filename filters given on the command line.
    pub filter: Vec<String>,
}

/// Aggregate failure counters for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailureCounts {
    pub failed_hooks: u64,
    pub failed_tests: u64,
    pub failed_workers: u64,
    pub internal_errors: u64,
    pub timeouts: u64,
    pub uncaught_exceptions: u64,
    pub unhandled_rejections: u64,
}

impl FailureCounts {
    pub fn total(&self) -> u64 {
        self.failed_hooks
            + self.failed_tests
            + self.failed_workers
            + self.internal_errors
            + self.timeouts
            + self.uncaught_exceptions
            + self.unhandled_rejections
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Per-file test counts from the most recent execution of that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStats {
    pub selected_tests: u64,
    pub declared_tests: u64,
}

/// Outcome of one run as reported by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStatus {
    pub failures: FailureCounts,
    pub files: HashMap<String, FileStats>,
}

impl RunStatus {
    pub fn file_stats(&self, file: &str) -> Option<&FileStats> {
        self.files.get(file)
    }
}
