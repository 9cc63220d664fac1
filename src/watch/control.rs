// src/watch/control.rs

//! Line-oriented control input (stdin in production).

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::SessionEvent;

/// A recognised control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `r` / `rs`: rerun every test file.
    RerunAll,
    /// `u`: rerun the previous run's files with snapshot updates enabled.
    UpdateSnapshots,
}

impl ControlCommand {
    /// Parse one input line; anything unrecognised yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "r" | "rs" => Some(ControlCommand::RerunAll),
            "u" => Some(ControlCommand::UpdateSnapshots),
            _ => None,
        }
    }
}

/// Read lines from `input` and forward recognised commands to the session.
///
/// The task ends when the input reaches EOF or the session goes away.
pub fn spawn_control_reader<R>(input: R, session_tx: mpsc::Sender<SessionEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read control input");
                    break;
                }
            };

            let Some(command) = ControlCommand::parse(&line) else {
                debug!(input = %line.trim(), "ignoring unrecognised control input");
                continue;
            };

            if session_tx.send(SessionEvent::Control(command)).await.is_err() {
                break;
            }
        }
        debug!("control reader finished");
    })
}
