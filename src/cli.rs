// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchtest`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchtest",
    version,
    about = "Watch a project and rerun the tests affected by each change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Watchtest.toml` in the current working directory. The
    /// directory containing the config is the watched project root.
    #[arg(long, value_name = "PATH", default_value = "Watchtest.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHTEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config, print the effective settings and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not run the whole suite when the watch session starts.
    #[arg(long)]
    pub no_initial_run: bool,

    /// Only run test files matching these globs.
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
