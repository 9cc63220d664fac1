// src/watch/path_utils.rs

//! Utility functions for turning watcher and telemetry paths into the
//! project-relative, forward-slash form every ledger is keyed by.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Only if both attempts fail do we give up.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(&rel.to_string_lossy()));
    }

    // macOS reports e.g. /private/var/... for /var/...
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_slash(&rel.to_string_lossy()));
        }
    }

    None
}

/// Normalise a path reported by the execution engine.
///
/// Absolute paths under `root` become project-relative; anything else is kept
/// as given, minus a leading `./`.
pub fn normalize_reported_path(root: &Path, reported: &str) -> String {
    let path = Path::new(reported);
    if path.is_absolute() {
        if let Some(rel) = relative_str(root, path) {
            return rel;
        }
    }
    let slashed = to_slash(reported);
    match slashed.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => slashed,
    }
}

fn to_slash(s: &str) -> String {
    s.replace('\\', "/")
}
