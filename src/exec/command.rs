// src/exec/command.rs

//! Execution engine that runs a configured shell command.
//!
//! The selected test files (or the CLI filters, for a full run) are passed as
//! positional arguments. Run parameters are exported as environment
//! variables. The command reports telemetry by printing lines of the form
//! `::watchtest::{json}` on stdout; every other line is echoed.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchtestError};
use crate::exec::backend::{ExecutionEngine, RunFuture, TelemetrySink};
use crate::exec::telemetry::{StatusAccumulator, TelemetryEvent};
use crate::types::{RunInstruction, RunStatus};

/// Prefix marking a stdout line as a telemetry event.
pub const TELEMETRY_PREFIX: &str = "::watchtest::";

#[derive(Debug, Clone)]
pub struct CommandEngine {
    cmd: String,
    root: PathBuf,
}

impl CommandEngine {
    pub fn new(cmd: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            root: root.into(),
        }
    }
}

impl ExecutionEngine for CommandEngine {
    fn run(&mut self, instruction: RunInstruction, telemetry: TelemetrySink) -> RunFuture {
        let cmd = self.cmd.clone();
        let root = self.root.clone();
        Box::pin(async move {
            run_command(&cmd, &root, &instruction, &telemetry)
                .await
                .map_err(|err| WatchtestError::Engine(format!("{err:#}")))
        })
    }
}

/// Parse one stdout line. `None` for ordinary output.
pub fn parse_telemetry_line(line: &str) -> Option<serde_json::Result<TelemetryEvent>> {
    let payload = line.trim_end().strip_prefix(TELEMETRY_PREFIX)?;
    Some(serde_json::from_str(payload))
}

/// Positional arguments for the test command.
pub fn command_args(instruction: &RunInstruction) -> Vec<String> {
    if instruction.files.is_empty() {
        instruction.filter.clone()
    } else {
        instruction.files.iter().cloned().collect()
    }
}

fn build_command(cmd: &str, args: &[String]) -> Command {
    if cfg!(windows) {
        let mut line = cmd.to_string();
        for arg in args {
            line.push_str(" \"");
            line.push_str(arg);
            line.push('"');
        }
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        // `"$@"` keeps file names with spaces intact.
        let mut c = Command::new("sh");
        c.arg("-c").arg(format!("{cmd} \"$@\"")).arg("watchtest").args(args);
        c
    }
}

async fn run_command(
    cmd: &str,
    root: &Path,
    instruction: &RunInstruction,
    telemetry: &TelemetrySink,
) -> anyhow::Result<RunStatus> {
    let args = command_args(instruction);
    info!(
        generation = instruction.generation,
        files = args.len(),
        cmd = %cmd,
        "starting test command"
    );

    let mut command = build_command(cmd, &args);
    command
        .current_dir(root)
        .env("WATCHTEST_GENERATION", instruction.generation.to_string())
        .env("WATCHTEST_FIRST_RUN", flag(instruction.is_first_run))
        .env(
            "WATCHTEST_PREVIOUS_FAILURES",
            instruction.previous_failure_count.to_string(),
        )
        .env("WATCHTEST_ONLY_EXCLUSIVE", flag(instruction.run_only_exclusive))
        .env("WATCHTEST_UPDATE_SNAPSHOTS", flag(instruction.update_snapshots))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning test command '{cmd}'"))?;

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                match read_lossy_line(&mut reader, &mut buf).await {
                    Ok(Some(line)) => eprintln!("{line}"),
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "failed to read test command stderr");
                        break;
                    }
                }
            }
        });
    }

    let mut accumulator = StatusAccumulator::new();
    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = read_lossy_line(&mut reader, &mut buf)
            .await
            .context("reading test command output")?
        {
            match parse_telemetry_line(&line) {
                None => println!("{line}"),
                Some(Ok(event)) => {
                    debug!(?event, "telemetry");
                    accumulator.observe(&event);
                    telemetry.emit(event).await?;
                }
                Some(Err(err)) => {
                    warn!(error = %err, line = %line, "malformed telemetry line");
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for test command '{cmd}'"))?;

    let mut run_status = accumulator.finish();
    if !status.success() && run_status.failures.is_clean() {
        // The command failed without telling us why.
        let code = status.code().unwrap_or(-1);
        warn!(exit_code = code, "test command failed without reporting failures");
        let event = TelemetryEvent::InternalError { test_file: None };
        run_status.failures.internal_errors += 1;
        telemetry.emit(event).await?;
    }

    info!(
        generation = instruction.generation,
        exit_code = status.code().unwrap_or(-1),
        failures = run_status.failures.total(),
        "test command finished"
    );
    Ok(run_status)
}

/// Read one line, replacing invalid UTF-8 instead of failing.
///
/// Test output is arbitrary bytes; only telemetry lines need to be text.
async fn read_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
