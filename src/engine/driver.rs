// src/engine/driver.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::{Result, WatchtestError};
use crate::types::RunStatus;

/// What the driver decided when a run was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    pub is_first_run: bool,
    pub clear_console: bool,
}

/// Owns the run counter and the single in-flight slot.
///
/// At most one run is in flight. The console is cleared before a run only
/// when the previous run was clean and no control command asked to keep the
/// output around.
#[derive(Debug, Default)]
pub struct RunDriver {
    generation: u64,
    in_flight: Option<u64>,
    clear_on_next_run: bool,
    suppress_clear_once: bool,
    previous_files: BTreeSet<String>,
}

impl RunDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently admitted run; 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Effective file set of the last admitted run (empty for a full run).
    pub fn previous_files(&self) -> &BTreeSet<String> {
        &self.previous_files
    }

    /// Keep the console contents for the next run.
    pub fn suppress_next_clear(&mut self) {
        self.suppress_clear_once = true;
    }

    /// Admit a run over `files`.
    pub fn begin(&mut self, files: &BTreeSet<String>) -> Result<Dispatch> {
        if let Some(in_flight) = self.in_flight {
            return Err(WatchtestError::RunInFlight {
                in_flight,
                requested: self.generation + 1,
            });
        }

        self.generation += 1;
        let is_first_run = self.generation == 1;
        let clear_console = !is_first_run && self.clear_on_next_run && !self.suppress_clear_once;
        self.suppress_clear_once = false;
        self.in_flight = Some(self.generation);
        self.previous_files = files.clone();

        debug!(
            generation = self.generation,
            is_first_run, clear_console, "run admitted"
        );
        Ok(Dispatch {
            generation: self.generation,
            is_first_run,
            clear_console,
        })
    }

    /// Release the in-flight slot. `None` means the engine failed.
    pub fn settle(&mut self, status: Option<&RunStatus>) {
        self.in_flight = None;
        self.clear_on_next_run = status.is_some_and(|s| s.failures.is_clean());
    }
}
