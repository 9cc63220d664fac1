// src/ledger/mod.rs

//! Per-session state updated from run telemetry.
//!
//! - [`dependencies`]: which files each test file touched last time it ran.
//! - [`exclusivity`]: test files currently running a `.only`-style subset.
//! - [`failures`]: outstanding failures per test file, keyed by generation.
//! - [`touched`]: self-inflicted changes that must not trigger reruns.
//!
//! None of these types are synchronised; the session actor owns them all.

pub mod dependencies;
pub mod exclusivity;
pub mod failures;
pub mod touched;

pub use dependencies::{DependencyTracker, TestDependency};
pub use exclusivity::{ExclusivityTracker, Reconciled};
pub use failures::{FailureLedger, FailureRecord};
pub use touched::TouchedFileLedger;
