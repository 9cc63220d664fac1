// src/exec/backend.rs

//! Pluggable execution engine abstraction.
//!
//! The session talks to an `ExecutionEngine` instead of spawning processes
//! itself. Production uses [`crate::exec::CommandEngine`]; tests provide a
//! scripted engine that emits telemetry and resolves on demand.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::SessionEvent;
use crate::errors::{Result, WatchtestError};
use crate::exec::telemetry::TelemetryEvent;
use crate::types::{RunInstruction, RunStatus};

/// Future returned by [`ExecutionEngine::run`].
///
/// It must not borrow the engine: the session keeps handling events while
/// the run is in flight.
pub type RunFuture = Pin<Box<dyn Future<Output = Result<RunStatus>> + Send + 'static>>;

/// Trait abstracting how a run is executed.
pub trait ExecutionEngine: Send {
    /// Start a run.
    ///
    /// Telemetry must be emitted through `telemetry` *before* the returned
    /// future resolves, so the session applies it ahead of the settlement.
    /// An `Err` is a driver-level failure, not a test failure.
    fn run(&mut self, instruction: RunInstruction, telemetry: TelemetrySink) -> RunFuture;
}

/// Channel registration between one run and the session.
#[derive(Debug, Clone)]
pub struct TelemetrySink {
    generation: u64,
    tx: mpsc::Sender<SessionEvent>,
}

impl TelemetrySink {
    pub fn new(generation: u64, tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn emit(&self, event: TelemetryEvent) -> Result<()> {
        self.tx
            .send(SessionEvent::Telemetry {
                generation: self.generation,
                event,
            })
            .await
            .map_err(|_| WatchtestError::Engine("session closed while emitting telemetry".into()))
    }
}
