// src/engine/core.rs

//! Pure core of the rerun engine.
//!
//! [`RerunCore`] owns every piece of per-session state:
//! - the dependency, exclusivity, failure and touched-file ledgers
//! - the run driver (generation counter and busy slot)
//! - the classification and ignore rules
//!
//! It turns dirty batches and control commands into [`RunPlan`]s, admits
//! runs, and applies run telemetry. It has no channels, no timers and
//! performs no IO, so it can be tested without Tokio.
//!
//! The async shell (`engine::runtime::Session`) feeds it events in order.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::decision::{DecisionInputs, decide};
use crate::engine::driver::RunDriver;
use crate::errors::Result;
use crate::exec::TelemetryEvent;
use crate::ledger::{DependencyTracker, ExclusivityTracker, FailureLedger, TouchedFileLedger};
use crate::types::{DirtyPath, RunInstruction, RunPlan, RunStatus};
use crate::watch::path_utils::normalize_reported_path;
use crate::watch::{ControlCommand, FileFilter, IgnoreMatcher, PathClassifier, ProviderSet};

/// A run admitted by the driver, ready to hand to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedRun {
    pub instruction: RunInstruction,
    pub clear_console: bool,
}

pub struct RerunCore {
    root: PathBuf,
    classifier: Arc<dyn PathClassifier>,
    ignore: IgnoreMatcher,
    providers: ProviderSet,
    filter: FileFilter,

    dependencies: DependencyTracker,
    exclusivity: ExclusivityTracker,
    failures: FailureLedger,
    touched: TouchedFileLedger,
    driver: RunDriver,
}

impl fmt::Debug for RerunCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RerunCore")
            .field("root", &self.root)
            .field("filter", &self.filter)
            .field("dependencies", &self.dependencies)
            .field("exclusivity", &self.exclusivity)
            .field("failures", &self.failures)
            .field("touched", &self.touched)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl RerunCore {
    pub fn new(
        root: impl Into<PathBuf>,
        classifier: Arc<dyn PathClassifier>,
        ignore: IgnoreMatcher,
        providers: ProviderSet,
        filter: FileFilter,
    ) -> Self {
        Self {
            root: root.into(),
            classifier,
            ignore,
            dependencies: DependencyTracker::new(providers.clone()),
            providers,
            filter,
            exclusivity: ExclusivityTracker::new(),
            failures: FailureLedger::new(),
            touched: TouchedFileLedger::new(),
            driver: RunDriver::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dependencies(&self) -> &DependencyTracker {
        &self.dependencies
    }

    pub fn exclusivity(&self) -> &ExclusivityTracker {
        &self.exclusivity
    }

    pub fn failures(&self) -> &FailureLedger {
        &self.failures
    }

    pub fn touched(&self) -> &TouchedFileLedger {
        &self.touched
    }

    pub fn driver(&self) -> &RunDriver {
        &self.driver
    }

    pub fn is_busy(&self) -> bool {
        self.driver.is_busy()
    }

    /// Decide what a debounced batch of dirty paths should rerun.
    pub fn plan_changes(&mut self, batch: Vec<DirtyPath>) -> RunPlan {
        let inputs = DecisionInputs {
            classifier: self.classifier.as_ref(),
            ignore: &self.ignore,
            providers: &self.providers,
            touched: &mut self.touched,
            dependencies: &mut self.dependencies,
            exclusivity: &mut self.exclusivity,
            failures: &mut self.failures,
        };
        decide(inputs, batch)
    }

    /// Plan for a control command. The flag is `update_snapshots`.
    ///
    /// Either command keeps the console contents for the run it triggers.
    pub fn plan_command(&mut self, command: ControlCommand) -> (RunPlan, bool) {
        self.driver.suppress_next_clear();
        match command {
            ControlCommand::RerunAll => {
                self.touched.clear_temporary();
                (RunPlan::All, false)
            }
            ControlCommand::UpdateSnapshots => {
                let files = self.driver.previous_files().clone();
                (RunPlan::from_files(files), true)
            }
        }
    }

    /// Admit a run for `plan`.
    ///
    /// Returns `Ok(None)` when there is nothing to run, either because the
    /// plan is `Skip` or because the CLI filter excludes every selected file.
    pub fn begin_run(&mut self, plan: RunPlan, update_snapshots: bool) -> Result<Option<StartedRun>> {
        if plan == RunPlan::Skip {
            return Ok(None);
        }

        let reconciled = self.exclusivity.reconcile(plan.into_files());
        let mut files = reconciled.files;

        if !self.filter.is_empty() && !files.is_empty() {
            files = self.filter.narrow(files);
            if files.is_empty() {
                info!("no selected test file matches the filter; skipping run");
                return Ok(None);
            }
        }

        if !files.is_empty() {
            self.failures.prune(&files);
        }

        let dispatch = self.driver.begin(&files)?;
        // Only the upcoming run's own writes may be suppressed from here on.
        self.touched.clear_touched();
        let previous_failure_count = self.failures.sum_before(dispatch.generation);

        let instruction = RunInstruction {
            files,
            is_first_run: dispatch.is_first_run,
            previous_failure_count,
            run_only_exclusive: reconciled.run_only_exclusive,
            update_snapshots,
            generation: dispatch.generation,
            filter: self.filter.patterns().to_vec(),
        };

        Ok(Some(StartedRun {
            instruction,
            clear_console: dispatch.clear_console,
        }))
    }

    /// Fold one telemetry event from the in-flight run into the ledgers.
    pub fn apply_telemetry(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::AccessedSnapshots { test_file, files } => {
                let test_file = self.normalize(&test_file);
                let files = files.iter().map(|f| self.normalize(f)).collect();
                self.dependencies.update(&test_file, files);
            }
            TelemetryEvent::TouchedFiles {
                changed_files,
                temporary_files,
            } => {
                let changed: Vec<String> = changed_files.iter().map(|f| self.normalize(f)).collect();
                let temporary: Vec<String> =
                    temporary_files.iter().map(|f| self.normalize(f)).collect();
                self.touched.record_touched(changed);
                self.touched.record_temporary(temporary);
            }
            TelemetryEvent::WorkerFinished {
                test_file,
                selected_tests,
                declared_tests,
            } => {
                let test_file = self.normalize(&test_file);
                self.exclusivity
                    .mark_exclusive(&test_file, declared_tests > selected_tests);
            }
            TelemetryEvent::Timeout { .. } => debug!("run reported a timeout"),
            failure => match failure.failure() {
                Some((kind, Some(file))) => {
                    let file = self.normalize(file);
                    debug!(file = %file, ?kind, "failure recorded");
                    self.failures.record(&file, self.driver.generation());
                }
                Some((kind, None)) => debug!(?kind, "failure without a test file"),
                None => {}
            },
        }
    }

    /// Release the busy slot. `None` means the execution engine failed.
    pub fn finish_run(&mut self, status: Option<&RunStatus>) {
        self.driver.settle(status);
    }

    fn normalize(&self, reported: &str) -> String {
        normalize_reported_path(&self.root, reported)
    }
}
