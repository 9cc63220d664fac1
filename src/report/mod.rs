// src/report/mod.rs

//! Reporter boundary: what the user sees around each run.

use crate::types::{RunInstruction, RunStatus};

/// Printed after every run, whatever its outcome.
pub const HINT_BANNER: &str = "Type `r` and press enter to rerun tests\nType `u` and press enter to update snapshots";

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[3J\x1b[H";

pub trait Reporter: Send {
    fn run_started(&mut self, instruction: &RunInstruction, clear_console: bool);

    /// `status` is `None` when the execution engine failed.
    fn run_finished(&mut self, instruction: &RunInstruction, status: Option<&RunStatus>);
}

/// Reporter writing to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&mut self, instruction: &RunInstruction, clear_console: bool) {
        if clear_console {
            print!("{CLEAR_SCREEN}");
        }
        println!("{}", describe_run(instruction));
        if instruction.previous_failure_count > 0 {
            println!(
                "  {} previous failure(s) in test files that were not rerun",
                instruction.previous_failure_count
            );
        }
    }

    fn run_finished(&mut self, _instruction: &RunInstruction, status: Option<&RunStatus>) {
        match status {
            Some(status) if status.failures.is_clean() => println!("\n[watchtest] all tests passed"),
            Some(status) => println!(
                "\n[watchtest] {} failure(s) ({} test, {} hook, {} worker, {} timeout, {} uncaught, {} unhandled, {} internal)",
                status.failures.total(),
                status.failures.failed_tests,
                status.failures.failed_hooks,
                status.failures.failed_workers,
                status.failures.timeouts,
                status.failures.uncaught_exceptions,
                status.failures.unhandled_rejections,
                status.failures.internal_errors,
            ),
            None => println!("\n[watchtest] run aborted"),
        }
        println!("\n{HINT_BANNER}\n");
    }
}

/// One-line summary of what a run covers.
pub fn describe_run(instruction: &RunInstruction) -> String {
    let scope = if instruction.files.is_empty() {
        "all test files".to_string()
    } else {
        let files: Vec<&str> = instruction.files.iter().map(String::as_str).collect();
        files.join(", ")
    };
    let mut line = format!("[watchtest] run #{}: {}", instruction.generation, scope);
    if instruction.run_only_exclusive {
        line.push_str(" (exclusive tests only in marked files)");
    }
    if instruction.update_snapshots {
        line.push_str(" (updating snapshots)");
    }
    line
}
