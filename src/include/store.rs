//! Page templates and the partial store.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// A page or fragment as read from disk. Never mutated; expansion produces new text.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    dir: PathBuf,
    text: String,
}

impl Template {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            dir,
            text: text.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let text = read_text(&path)?;
        Ok(Self::new(path, text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative references are resolved against.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Read a file as text. Invalid UTF-8 is replaced, not rejected: only io
/// failures make a page or fragment unreadable.
fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Read-through cache of fragment files, shared by all pages of one build.
///
/// Only successful reads are cached: a missing partial is looked up again by
/// the next directive that names it.
#[derive(Debug, Default)]
pub struct PartialStore {
    cache: RwLock<FxHashMap<PathBuf, Arc<str>>>,
}

impl PartialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment text at `path`, from cache or disk.
    pub fn read(&self, path: &Path) -> io::Result<Arc<str>> {
        if let Some(text) = self.cache.read().get(path) {
            return Ok(Arc::clone(text));
        }

        let text: Arc<str> = read_text(path)?.into();
        self.cache
            .write()
            .insert(path.to_path_buf(), Arc::clone(&text));
        Ok(text)
    }

    /// Number of distinct fragments read so far.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }
}
