// src/config/validate.rs

use crate::config::model::{ConfigFile, MIN_DEBOUNCE_MS, RawConfigFile};
use crate::errors::{Result, WatchtestError};
use crate::watch::patterns::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchtestError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_watch(cfg)?;
    validate_globs(cfg)?;
    validate_rewrites(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.cmd.trim().is_empty() {
        return Err(WatchtestError::ConfigError(
            "[engine].cmd must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms < MIN_DEBOUNCE_MS {
        return Err(WatchtestError::ConfigError(format!(
            "[watch].debounce_ms must be >= {} (got {})",
            MIN_DEBOUNCE_MS, cfg.watch.debounce_ms
        )));
    }
    Ok(())
}

fn validate_globs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tests.files.is_empty() {
        return Err(WatchtestError::ConfigError(
            "[tests].files must contain at least one glob".to_string(),
        ));
    }

    build_globset(&cfg.tests.files)?;
    build_globset(&cfg.tests.helpers)?;
    build_globset(&cfg.tests.ignored_by_watcher)?;
    build_globset(&cfg.watch.ignore)?;
    Ok(())
}

fn validate_rewrites(cfg: &RawConfigFile) -> Result<()> {
    for (idx, entry) in cfg.rewrite.iter().enumerate() {
        if entry.source.trim().is_empty() || entry.compiled.trim().is_empty() {
            return Err(WatchtestError::ConfigError(format!(
                "[[rewrite]] entry {} needs both `source` and `compiled`",
                idx
            )));
        }
        if entry.source == entry.compiled {
            return Err(WatchtestError::ConfigError(format!(
                "[[rewrite]] entry {} maps '{}' onto itself",
                idx, entry.source
            )));
        }
    }
    Ok(())
}
