// src/exec/telemetry.rs

//! Telemetry emitted by the execution engine while a run is in progress.
//!
//! On the wire (see [`crate::exec::command`]) each event is one JSON object
//! tagged by `type`, e.g.
//!
//! ```json
//! {"type":"test-failed","testFile":"test/a.test.js"}
//! {"type":"touched-files","changedFiles":["coverage/lcov.info"],"temporaryFiles":[]}
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{FileStats, RunStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TelemetryEvent {
    /// A test file read or wrote these files (snapshots, fixtures, ...).
    AccessedSnapshots {
        test_file: String,
        #[serde(default)]
        files: Vec<String>,
    },
    /// Files the run itself changed or created.
    TouchedFiles {
        #[serde(default)]
        changed_files: Vec<String>,
        #[serde(default)]
        temporary_files: Vec<String>,
    },
    /// A worker finished executing one test file.
    WorkerFinished {
        test_file: String,
        selected_tests: u64,
        declared_tests: u64,
    },
    HookFailed {
        #[serde(default)]
        test_file: Option<String>,
    },
    InternalError {
        #[serde(default)]
        test_file: Option<String>,
    },
    ProcessExit {
        #[serde(default)]
        test_file: Option<String>,
    },
    TestFailed {
        #[serde(default)]
        test_file: Option<String>,
    },
    UncaughtException {
        #[serde(default)]
        test_file: Option<String>,
    },
    UnhandledRejection {
        #[serde(default)]
        test_file: Option<String>,
    },
    WorkerFailed {
        #[serde(default)]
        test_file: Option<String>,
    },
    Timeout {
        #[serde(default)]
        test_file: Option<String>,
    },
}

/// Failure classes that feed the failure ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    HookFailed,
    InternalError,
    ProcessExit,
    TestFailed,
    UncaughtException,
    UnhandledRejection,
    WorkerFailed,
}

impl TelemetryEvent {
    /// The failure class and test file of a failure-classified event.
    ///
    /// `Timeout` is counted in the run status but is not a per-file failure.
    pub fn failure(&self) -> Option<(FailureKind, Option<&str>)> {
        let (kind, file) = match self {
            TelemetryEvent::HookFailed { test_file } => (FailureKind::HookFailed, test_file),
            TelemetryEvent::InternalError { test_file } => (FailureKind::InternalError, test_file),
            TelemetryEvent::ProcessExit { test_file } => (FailureKind::ProcessExit, test_file),
            TelemetryEvent::TestFailed { test_file } => (FailureKind::TestFailed, test_file),
            TelemetryEvent::UncaughtException { test_file } => {
                (FailureKind::UncaughtException, test_file)
            }
            TelemetryEvent::UnhandledRejection { test_file } => {
                (FailureKind::UnhandledRejection, test_file)
            }
            TelemetryEvent::WorkerFailed { test_file } => (FailureKind::WorkerFailed, test_file),
            _ => return None,
        };
        Some((kind, file.as_deref()))
    }

    pub fn test_failed(file: impl Into<String>) -> Self {
        TelemetryEvent::TestFailed {
            test_file: Some(file.into()),
        }
    }

    pub fn worker_finished(file: impl Into<String>, selected: u64, declared: u64) -> Self {
        TelemetryEvent::WorkerFinished {
            test_file: file.into(),
            selected_tests: selected,
            declared_tests: declared,
        }
    }

    pub fn accessed(file: impl Into<String>, files: Vec<String>) -> Self {
        TelemetryEvent::AccessedSnapshots {
            test_file: file.into(),
            files,
        }
    }

    pub fn touched(changed: Vec<String>, temporary: Vec<String>) -> Self {
        TelemetryEvent::TouchedFiles {
            changed_files: changed,
            temporary_files: temporary,
        }
    }
}

/// Folds telemetry into the [`RunStatus`] of one run.
#[derive(Debug, Default)]
pub struct StatusAccumulator {
    status: RunStatus,
}

impl StatusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &TelemetryEvent) {
        let failures = &mut self.status.failures;
        match event {
            TelemetryEvent::HookFailed { .. } => failures.failed_hooks += 1,
            TelemetryEvent::TestFailed { .. } => failures.failed_tests += 1,
            TelemetryEvent::WorkerFailed { .. } | TelemetryEvent::ProcessExit { .. } => {
                failures.failed_workers += 1
            }
            TelemetryEvent::InternalError { .. } => failures.internal_errors += 1,
            TelemetryEvent::Timeout { .. } => failures.timeouts += 1,
            TelemetryEvent::UncaughtException { .. } => failures.uncaught_exceptions += 1,
            TelemetryEvent::UnhandledRejection { .. } => failures.unhandled_rejections += 1,
            TelemetryEvent::WorkerFinished {
                test_file,
                selected_tests,
                declared_tests,
            } => {
                self.status.files.insert(
                    test_file.clone(),
                    FileStats {
                        selected_tests: *selected_tests,
                        declared_tests: *declared_tests,
                    },
                );
            }
            TelemetryEvent::AccessedSnapshots { .. } | TelemetryEvent::TouchedFiles { .. } => {}
        }
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn finish(self) -> RunStatus {
        self.status
    }
}
