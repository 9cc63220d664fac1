// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::SessionEvent;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::DirtyPath;
use crate::watch::path_utils::relative_str;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a recursive filesystem watcher on `root` that forwards every
/// relevant path as `SessionEvent::FileChanged`.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    fs: Arc<dyn FileSystem>,
    session_tx: mpsc::Sender<SessionEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = fs.canonicalize(&root).unwrap_or(root);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("watchtest: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("watchtest: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .context("creating filesystem watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", root))?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");
            for dirty in dirty_paths_from_event(fs.as_ref(), &root, &event) {
                if session_tx
                    .send(SessionEvent::FileChanged(dirty))
                    .await
                    .is_err()
                {
                    debug!("session closed; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Turn one notify event into project-relative dirty paths.
///
/// - access events are dropped;
/// - directories are dropped;
/// - removals, and paths that no longer exist, are `deleted`;
/// - everything else is `changed`.
pub fn dirty_paths_from_event(fs: &dyn FileSystem, root: &Path, event: &Event) -> Vec<DirtyPath> {
    if matches!(event.kind, EventKind::Access(_)) {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        let Some(rel) = relative_str(root, path) else {
            warn!(
                "could not relativize path {:?} against root {:?}",
                path, root
            );
            continue;
        };
        if rel.is_empty() {
            continue;
        }

        let removed = matches!(event.kind, EventKind::Remove(_)) || !fs.exists(path);
        if removed {
            out.push(DirtyPath::deleted(rel));
        } else if fs.is_dir(path) {
            continue;
        } else {
            out.push(DirtyPath::changed(rel));
        }
    }
    out
}
