// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchtestError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The execution engine rejected a run for a reason other than a
    /// recorded test failure.
    #[error("Execution engine error: {0}")]
    Engine(String),

    /// A run was dispatched while another one was still in flight.
    #[error("Run {requested} dispatched while run {in_flight} is still in flight")]
    RunInFlight { in_flight: u64, requested: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchtestError>;
