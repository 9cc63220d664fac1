// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod ledger;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{RerunCore, Session, SessionEvent, SessionOptions};
use crate::exec::CommandEngine;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::ConsoleReporter;
use crate::watch::{
    FileChangeAggregator, FileFilter, GlobClassifier, IgnoreMatcher, ProviderSet,
    spawn_control_reader, spawn_watcher,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - classifier, ignore rules and rewrite providers
/// - the rerun core and its session
/// - the command execution engine and console reporter
/// - file watcher, stdin control reader and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg, &args.filters);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root_dir = config_root_dir(&config_path);
    let root = fs
        .canonicalize(&root_dir)
        .with_context(|| format!("resolving project root {}", root_dir.display()))?;
    info!(root = %root.display(), "watching project");

    let classifier = GlobClassifier::from_config(&cfg)?;
    let ignore = IgnoreMatcher::from_config(&cfg)?;
    let providers = ProviderSet::from_config(&cfg);
    let filter = FileFilter::new(args.filters.clone())?;

    let core = RerunCore::new(root.clone(), Arc::new(classifier), ignore, providers, filter);
    let aggregator = FileChangeAggregator::new(Duration::from_millis(cfg.watch().debounce_ms));
    let engine = CommandEngine::new(cfg.engine().cmd.clone(), root.clone());
    let options = SessionOptions {
        initial_run: !args.no_initial_run,
    };

    let session = Session::new(core, aggregator, engine, ConsoleReporter::new(), options);

    // Dropping the handle stops watching, so keep it for the whole session.
    let _watcher = spawn_watcher(root, fs, session.sender())?;
    let _control = spawn_control_reader(tokio::io::stdin(), session.sender());

    // Ctrl-C → graceful shutdown.
    {
        let tx = session.sender();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SessionEvent::ShutdownRequested).await;
        });
    }

    session.run().await?;
    Ok(())
}

/// Figure out a sensible project root for watching.
///
/// - If the config path has a non-empty parent (e.g. "web/Watchtest.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchtest.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(cfg: &ConfigFile, filters: &[String]) {
    println!("watchtest dry-run");
    println!("  engine.cmd = {}", cfg.engine().cmd);
    println!("  watch.debounce_ms = {}", cfg.watch().debounce_ms);
    println!();

    println!("tests:");
    println!("  files: {:?}", cfg.tests().files);
    if !cfg.tests().helpers.is_empty() {
        println!("  helpers: {:?}", cfg.tests().helpers);
    }
    if !cfg.tests().ignored_by_watcher.is_empty() {
        println!("  ignored_by_watcher: {:?}", cfg.tests().ignored_by_watcher);
    }
    if !cfg.watch().ignore.is_empty() {
        println!("  ignore: {:?}", cfg.watch().ignore);
    }

    if !cfg.rewrites().is_empty() {
        println!();
        println!("rewrites ({}):", cfg.rewrites().len());
        for rewrite in cfg.rewrites() {
            println!("  - {} -> {}", rewrite.source, rewrite.compiled);
        }
    }

    if !filters.is_empty() {
        println!();
        println!("filters: {filters:?}");
    }

    debug!("dry-run complete (no execution)");
}
