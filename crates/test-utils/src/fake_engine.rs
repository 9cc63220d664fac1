use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use watchtest::engine::{RerunCore, Session, SessionEvent, SessionOptions};
use watchtest::errors::{Result, WatchtestError};
use watchtest::exec::{ExecutionEngine, RunFuture, TelemetryEvent, TelemetrySink};
use watchtest::report::Reporter;
use watchtest::types::{RunInstruction, RunStatus};
use watchtest::watch::FileChangeAggregator;

/// What one scripted run does.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    pub telemetry: Vec<TelemetryEvent>,
    pub status: RunStatus,
    /// Make the run fail with an engine error instead of returning `status`.
    pub engine_error: Option<String>,
    /// Hold the run in flight until this is notified.
    pub gate: Option<Arc<Notify>>,
    /// Emitted shortly after the run has resolved, as a straggling worker
    /// would.
    pub late_telemetry: Vec<TelemetryEvent>,
}

impl ScriptedRun {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn with_telemetry(mut self, event: TelemetryEvent) -> Self {
        self.telemetry.push(event);
        self
    }

    pub fn failing_tests(mut self, count: u64) -> Self {
        self.status.failures.failed_tests = count;
        self
    }

    pub fn engine_error(mut self, msg: &str) -> Self {
        self.engine_error = Some(msg.to_string());
        self
    }

    pub fn with_late_telemetry(mut self, event: TelemetryEvent) -> Self {
        self.late_telemetry.push(event);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    instructions: Vec<RunInstruction>,
    scripts: VecDeque<ScriptedRun>,
}

/// A fake execution engine that:
/// - records every instruction it receives
/// - replays scripted telemetry and outcomes, one script per run
/// - runs clean and instantly once the script queue is empty
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, script: ScriptedRun) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    pub fn instructions(&self) -> Vec<RunInstruction> {
        self.state.lock().unwrap().instructions.clone()
    }

    pub fn run_count(&self) -> usize {
        self.state.lock().unwrap().instructions.len()
    }

    pub fn last(&self) -> Option<RunInstruction> {
        self.state.lock().unwrap().instructions.last().cloned()
    }
}

impl ExecutionEngine for FakeEngine {
    fn run(&mut self, instruction: RunInstruction, telemetry: TelemetrySink) -> RunFuture {
        let script = {
            let mut guard = self.state.lock().unwrap();
            guard.instructions.push(instruction);
            guard.scripts.pop_front().unwrap_or_default()
        };

        Box::pin(async move {
            for event in script.telemetry {
                telemetry.emit(event).await?;
            }
            if let Some(gate) = script.gate {
                gate.notified().await;
            }
            if !script.late_telemetry.is_empty() {
                let late = script.late_telemetry;
                let sink = telemetry.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    for event in late {
                        let _ = sink.emit(event).await;
                    }
                });
            }
            match script.engine_error {
                Some(msg) => Err(WatchtestError::Engine(msg)),
                None => Ok(script.status),
            }
        })
    }
}

/// One reporter callback, as observed by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    Started { generation: u64, clear_console: bool },
    Finished { generation: u64, ok: bool },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    entries: Arc<Mutex<Vec<ReportEntry>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// `clear_console` flag of every started run, in order.
    pub fn clears(&self) -> Vec<bool> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                ReportEntry::Started { clear_console, .. } => Some(clear_console),
                ReportEntry::Finished { .. } => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn run_started(&mut self, instruction: &RunInstruction, clear_console: bool) {
        self.entries.lock().unwrap().push(ReportEntry::Started {
            generation: instruction.generation,
            clear_console,
        });
    }

    fn run_finished(&mut self, instruction: &RunInstruction, status: Option<&RunStatus>) {
        self.entries.lock().unwrap().push(ReportEntry::Finished {
            generation: instruction.generation,
            ok: status.is_some(),
        });
    }
}

/// A session running on the current test runtime with fake collaborators.
pub struct SessionHarness {
    pub tx: mpsc::Sender<SessionEvent>,
    pub engine: FakeEngine,
    pub reporter: RecordingReporter,
    pub handle: JoinHandle<Result<RerunCore>>,
}

impl SessionHarness {
    pub fn spawn(core: RerunCore, engine: FakeEngine, options: SessionOptions) -> Self {
        let reporter = RecordingReporter::new();
        let session = Session::new(
            core,
            FileChangeAggregator::default(),
            engine.clone(),
            reporter.clone(),
            options,
        );
        let tx = session.sender();
        let handle = tokio::spawn(session.run());
        Self {
            tx,
            engine,
            reporter,
            handle,
        }
    }

    pub async fn send(&self, event: SessionEvent) {
        self.tx.send(event).await.expect("session alive");
    }

    /// Request shutdown and return the final core state.
    pub async fn shutdown(self) -> RerunCore {
        // The session may already have stopped with an error.
        let _ = self.tx.send(SessionEvent::ShutdownRequested).await;
        self.handle
            .await
            .expect("session task panicked")
            .expect("session returned an error")
    }
}
