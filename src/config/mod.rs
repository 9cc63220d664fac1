// src/config/mod.rs

//! Configuration loading and validation for watchtest.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a [`ConfigFile`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_fs, load_from_path};
pub use model::{
    ConfigFile, DEFAULT_DEBOUNCE_MS, EngineSection, MIN_DEBOUNCE_MS, RawConfigFile,
    RewriteConfig, TestsSection, WatchSection,
};
