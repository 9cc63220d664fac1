// src/watch/aggregator.rs

//! Debounced collection of dirty paths.
//!
//! This is the pure state machine behind the debounce timer. It never sleeps
//! itself: it tells the caller when to arm a timer (`ArmTimer`) and is told
//! when that timer elapsed and when the in-flight run settled.
//!
//! Timer behaviour:
//! - The first event of a batch arms a timer for the quiet period.
//! - Further events while a timer is armed only mark the batch as "again".
//! - On expiry, if a run is in flight, resolution waits for it to settle.
//! - On resolution, an "again" batch is re-armed with half the previous delay
//!   (floored at [`MIN_QUIET_PERIOD`]); otherwise the batch is flushed.
//!
//! Every armed timer gets a fresh [`TimerToken`]. Cancelling forgets the
//! token, so an expiry that was already in flight is reported as `Stale`.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, trace};

use crate::types::{ChangeKind, DirtyPath};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);
pub const MIN_QUIET_PERIOD: Duration = Duration::from_millis(10);

/// Identity of one armed debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Request to arm a timer that reports back with `token` after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmTimer {
    pub token: TimerToken,
    pub delay: Duration,
}

/// What the caller should do after a timer expiry or run settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// Not for the current timer, or nothing was waiting.
    Stale,
    /// A run is in flight; call [`FileChangeAggregator::on_run_settled`] later.
    AwaitRun,
    /// More events arrived; arm this shorter timer.
    Rearm(ArmTimer),
    /// Quiet period over; hand this batch to the decision engine.
    Flush(Vec<DirtyPath>),
}

#[derive(Debug, Clone, Copy)]
struct ActiveTimer {
    token: TimerToken,
    delay: Duration,
}

#[derive(Debug)]
pub struct FileChangeAggregator {
    quiet_period: Duration,
    pending: BTreeMap<String, ChangeKind>,
    timer: Option<ActiveTimer>,
    again: bool,
    awaiting_run: bool,
    next_token: u64,
}

impl Default for FileChangeAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl FileChangeAggregator {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period: quiet_period.max(MIN_QUIET_PERIOD),
            pending: BTreeMap::new(),
            timer: None,
            again: false,
            awaiting_run: false,
            next_token: 0,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record a dirty path. Returns a timer to arm if none is active.
    pub fn on_event(&mut self, dirty: DirtyPath) -> Option<ArmTimer> {
        trace!(path = %dirty.path, kind = ?dirty.kind, "dirty path queued");
        self.pending.insert(dirty.path, dirty.kind);

        if self.timer.is_some() {
            self.again = true;
            return None;
        }
        Some(self.arm(self.quiet_period))
    }

    /// The timer identified by `token` elapsed.
    pub fn on_elapsed(&mut self, token: TimerToken, run_in_flight: bool) -> Expiry {
        match self.timer {
            Some(active) if active.token == token && !self.awaiting_run => {}
            _ => {
                trace!(?token, "ignoring stale debounce expiry");
                return Expiry::Stale;
            }
        }

        if run_in_flight {
            debug!("debounce elapsed during a run; waiting for it to settle");
            self.awaiting_run = true;
            return Expiry::AwaitRun;
        }

        self.resolve()
    }

    /// The in-flight run settled.
    pub fn on_run_settled(&mut self) -> Expiry {
        if !self.awaiting_run {
            return Expiry::Stale;
        }
        self.awaiting_run = false;
        if self.timer.is_none() {
            return Expiry::Stale;
        }
        self.resolve()
    }

    /// Cancel the active timer, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(active) = self.timer.take() {
            debug!(token = ?active.token, "debounce timer cancelled");
        }
        self.again = false;
        self.awaiting_run = false;
    }

    /// Forget every queued dirty path.
    pub fn clear_batch(&mut self) {
        self.pending.clear();
    }

    fn arm(&mut self, delay: Duration) -> ArmTimer {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.timer = Some(ActiveTimer { token, delay });
        ArmTimer { token, delay }
    }

    fn resolve(&mut self) -> Expiry {
        let Some(active) = self.timer else {
            return Expiry::Stale;
        };

        if self.again {
            self.again = false;
            let delay = (active.delay / 2).max(MIN_QUIET_PERIOD);
            debug!(?delay, "changes kept arriving; re-arming debounce");
            return Expiry::Rearm(self.arm(delay));
        }

        self.timer = None;
        let batch: Vec<DirtyPath> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(path, kind)| DirtyPath { path, kind })
            .collect();
        debug!(paths = batch.len(), "debounce settled; flushing batch");
        Expiry::Flush(batch)
    }
}
