//! Filesystem path helpers shared by config loading and the watcher.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Normalize a path to absolute form for reliable comparison.
///
/// Config paths are canonicalized, so incoming paths (e.g., from the file
/// watcher) must be canonicalized too before they are compared.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// True if `a` and `b` are the same directory or one contains the other.
pub fn paths_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
