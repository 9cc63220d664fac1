// src/engine/mod.rs

//! Rerun engine for watchtest.
//!
//! This module ties together:
//! - the ledgers updated from run telemetry
//! - the rerun decision for a batch of dirty paths
//! - the run driver (generation counter, busy slot, console policy)
//! - the session event loop reacting to:
//!   - filesystem changes
//!   - control commands
//!   - telemetry and run settlement
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::errors::Result;
use crate::exec::TelemetryEvent;
use crate::types::{DirtyPath, RunStatus};
use crate::watch::{ControlCommand, TimerToken};

/// Events flowing into the session from the watcher, stdin, timers and runs.
#[derive(Debug)]
pub enum SessionEvent {
    /// Entry point: raw filesystem event received.
    FileChanged(DirtyPath),
    /// Entry point: control command received.
    Control(ControlCommand),
    /// Telemetry from the run with this generation.
    Telemetry {
        generation: u64,
        event: TelemetryEvent,
    },
    /// A debounce timer elapsed.
    DebounceElapsed(TimerToken),
    /// The run with this generation completed or was rejected.
    RunSettled {
        generation: u64,
        result: Result<RunStatus>,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Session options.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Run the whole suite as soon as the session starts.
    pub initial_run: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { initial_run: true }
    }
}

pub mod core;
pub mod decision;
pub mod driver;
pub mod runtime;

pub use self::core::{RerunCore, StartedRun};
pub use decision::{DecisionInputs, decide};
pub use driver::{Dispatch, RunDriver};
pub use runtime::Session;
