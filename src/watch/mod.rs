// src/watch/mod.rs

//! File watching and change intake.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing raw events into batches ([`aggregator`]).
//! - Classifying paths and composing ignore rules ([`classifier`],
//!   [`patterns`], [`providers`]).
//! - Reading control commands from the terminal ([`control`]).
//!
//! It does **not** decide what to rerun; see [`crate::engine`].

pub mod aggregator;
pub mod classifier;
pub mod control;
pub mod path_utils;
pub mod patterns;
pub mod providers;
pub mod watcher;

pub use aggregator::{
    ArmTimer, DEFAULT_QUIET_PERIOD, Expiry, FileChangeAggregator, MIN_QUIET_PERIOD, TimerToken,
};
pub use classifier::{GlobClassifier, PathClassifier};
pub use control::{ControlCommand, spawn_control_reader};
pub use patterns::{DEFAULT_IGNORE_PATTERNS, FileFilter, IgnoreMatcher, build_globset};
pub use providers::{ChangeIgnoreProvider, ProviderSet, RewriteProvider};
pub use watcher::{WatcherHandle, dirty_paths_from_event, spawn_watcher};
