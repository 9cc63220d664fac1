// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::exec::{ExecutionEngine, TelemetrySink};
use crate::report::Reporter;
use crate::types::{RunInstruction, RunPlan, RunStatus};
use crate::watch::{ArmTimer, ControlCommand, Expiry, FileChangeAggregator};

use super::core::RerunCore;
use super::{SessionEvent, SessionOptions};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Drives the rerun core in response to `SessionEvent`s and delegates run
/// execution to an `ExecutionEngine`.
///
/// This is the single owner of all session state. Watcher, control reader,
/// debounce timers and in-flight runs only talk to it through the event
/// channel, so telemetry emitted by a run is always applied before that
/// run's settlement is handled.
pub struct Session<E: ExecutionEngine, R: Reporter> {
    core: RerunCore,
    aggregator: FileChangeAggregator,
    engine: E,
    reporter: R,
    options: SessionOptions,
    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,
    current: Option<RunInstruction>,
    deferred: Option<ControlCommand>,
}

impl<E: ExecutionEngine, R: Reporter> fmt::Debug for Session<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("core", &self.core)
            .field("aggregator", &self.aggregator)
            .field("options", &self.options)
            .field("current", &self.current)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutionEngine, R: Reporter> Session<E, R> {
    pub fn new(
        core: RerunCore,
        aggregator: FileChangeAggregator,
        engine: E,
        reporter: R,
        options: SessionOptions,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            core,
            aggregator,
            engine,
            reporter,
            options,
            event_tx,
            event_rx,
            current: None,
            deferred: None,
        }
    }

    /// Sender for producers (watcher, control reader, signal handler).
    pub fn sender(&self) -> mpsc::Sender<SessionEvent> {
        self.event_tx.clone()
    }

    pub fn core(&self) -> &RerunCore {
        &self.core
    }

    /// Main event loop.
    ///
    /// Returns when shutdown is requested, or with the error of a run whose
    /// execution engine failed.
    pub async fn run(mut self) -> Result<RerunCore> {
        info!("watchtest session started");

        if self.options.initial_run {
            self.start(RunPlan::All, false)?;
        }

        // `self` holds a sender, so `recv` only yields `None` if every
        // producer including us is gone.
        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "session received event");
            match event {
                SessionEvent::FileChanged(dirty) => {
                    if let Some(timer) = self.aggregator.on_event(dirty) {
                        self.schedule(timer);
                    }
                }
                SessionEvent::DebounceElapsed(token) => {
                    let expiry = self.aggregator.on_elapsed(token, self.core.is_busy());
                    self.on_expiry(expiry)?;
                }
                SessionEvent::Control(command) => self.on_control(command)?,
                SessionEvent::Telemetry { generation, event } => {
                    if self.core.driver().in_flight() == Some(generation) {
                        self.core.apply_telemetry(event);
                    } else {
                        warn!(generation, "dropping telemetry from a settled run");
                    }
                }
                SessionEvent::RunSettled { generation, result } => {
                    self.on_run_settled(generation, result)?;
                }
                SessionEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping session");
                    break;
                }
            }
        }

        self.aggregator.cancel();
        info!("session exiting");
        Ok(self.core)
    }

    fn schedule(&self, timer: ArmTimer) {
        debug!(token = ?timer.token, delay_ms = timer.delay.as_millis() as u64, "debounce timer armed");
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timer.delay).await;
            let _ = tx.send(SessionEvent::DebounceElapsed(timer.token)).await;
        });
    }

    fn on_expiry(&mut self, expiry: Expiry) -> Result<()> {
        match expiry {
            Expiry::Stale | Expiry::AwaitRun => Ok(()),
            Expiry::Rearm(timer) => {
                self.schedule(timer);
                Ok(())
            }
            Expiry::Flush(batch) => {
                debug!(paths = batch.len(), "debounced batch ready");
                let plan = self.core.plan_changes(batch);
                self.start(plan, false)
            }
        }
    }

    fn on_control(&mut self, command: ControlCommand) -> Result<()> {
        self.aggregator.cancel();
        if self.core.is_busy() {
            debug!(?command, "run in flight; deferring control command");
            self.deferred = Some(command);
            return Ok(());
        }
        self.run_command(command)
    }

    fn run_command(&mut self, command: ControlCommand) -> Result<()> {
        info!(?command, "control command");
        self.aggregator.cancel();
        self.aggregator.clear_batch();
        let (plan, update_snapshots) = self.core.plan_command(command);
        self.start(plan, update_snapshots)
    }

    fn on_run_settled(&mut self, generation: u64, result: Result<RunStatus>) -> Result<()> {
        let Some(instruction) = self.current.take() else {
            warn!(generation, "settlement for an unknown run");
            return Ok(());
        };

        match result {
            Ok(status) => {
                info!(
                    generation,
                    failures = status.failures.total(),
                    "run settled"
                );
                self.core.finish_run(Some(&status));
                self.reporter.run_finished(&instruction, Some(&status));
            }
            Err(err) => {
                error!(generation, error = %err, "execution engine failed");
                self.core.finish_run(None);
                self.reporter.run_finished(&instruction, None);
                return Err(err);
            }
        }

        if let Some(command) = self.deferred.take() {
            return self.run_command(command);
        }

        let expiry = self.aggregator.on_run_settled();
        self.on_expiry(expiry)
    }

    fn start(&mut self, plan: RunPlan, update_snapshots: bool) -> Result<()> {
        let Some(started) = self.core.begin_run(plan, update_snapshots)? else {
            debug!("nothing to run");
            return Ok(());
        };

        let instruction = started.instruction;
        self.reporter.run_started(&instruction, started.clear_console);

        let generation = instruction.generation;
        let sink = TelemetrySink::new(generation, self.event_tx.clone());
        let future = self.engine.run(instruction.clone(), sink);
        self.current = Some(instruction);

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = future.await;
            if tx
                .send(SessionEvent::RunSettled { generation, result })
                .await
                .is_err()
            {
                debug!(generation, "session gone before run settled");
            }
        });
        Ok(())
    }
}
