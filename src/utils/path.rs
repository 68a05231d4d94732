//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - CLI paths that may be cwd- or project-relative

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first. Paths that do not exist yet (an output
/// directory before the first build) are joined with the current directory
/// instead.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a path given on the command line.
///
/// Tries in order:
/// 1. If absolute, use as-is
/// 2. If it exists relative to cwd, normalize to absolute
/// 3. Otherwise, resolve relative to `root` (the project root)
///
/// `hotloop run src/main.c` from a subdirectory still finds the entry.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if path.exists() {
        return normalize_path(path);
    }

    normalize_path(&root.join(path))
}
