// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `ExecutionEngine` trait the session drives and
//!   the `TelemetrySink` a run reports through.
//! - [`telemetry`] defines the telemetry events and folds them into a
//!   `RunStatus`.
//! - [`command`] is the production engine: it runs the configured test
//!   command with `tokio::process::Command` and parses its telemetry lines.

pub mod backend;
pub mod command;
pub mod telemetry;

pub use backend::{ExecutionEngine, RunFuture, TelemetrySink};
pub use command::{CommandEngine, TELEMETRY_PREFIX, command_args, parse_telemetry_line};
pub use telemetry::{FailureKind, StatusAccumulator, TelemetryEvent};
