//! Include reference resolution.
//!
//! Maps a raw reference and the directory of the document containing it to a
//! single candidate path. Rules, first match wins:
//!
//! 1. absolute (`/partials/head.html`) → rooted at the source root
//! 2. bare name (`head`, `head.html`) → `<source>/<partials>/`, default
//!    extension appended when missing
//! 3. starts with the partials directory (`_partials/nav/top.html`) → source root
//! 4. anything else (`./aside.html`, `../shared/x.html`) → containing directory
//!
//! Resolution never touches the filesystem; callers check existence.

use crate::config::BuildConfig;
use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

/// Pure reference → path mapping for one source tree.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    partials: PathBuf,
    default_extension: String,
}

impl PathResolver {
    pub fn new(
        root: impl Into<PathBuf>,
        partials: impl Into<PathBuf>,
        default_extension: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            partials: partials.into(),
            default_extension: default_extension.into(),
        }
    }

    pub fn from_config(build: &BuildConfig) -> Self {
        Self::new(&build.source, &build.partials, &build.default_extension)
    }

    /// Source root every rooted reference is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `reference` as written in a document living in `containing_dir`.
    pub fn resolve(&self, reference: &str, containing_dir: &Path) -> PathBuf {
        let reference: Cow<'_, str> = if reference.contains('\\') {
            Cow::Owned(reference.replace('\\', "/"))
        } else {
            Cow::Borrowed(reference)
        };
        let reference_path = Path::new(reference.as_ref());

        let joined = if reference.starts_with('/') || reference_path.is_absolute() {
            // `..` never climbs above the source root
            let mut relative = PathBuf::new();
            for component in reference_path.components() {
                match component {
                    Component::Normal(part) => relative.push(part),
                    Component::ParentDir => {
                        relative.pop();
                    }
                    _ => {}
                }
            }
            self.root.join(relative)
        } else if !reference.contains('/') {
            let mut path = self.root.join(&self.partials).join(reference_path);
            if reference_path.extension().is_none() {
                path.set_extension(&self.default_extension);
            }
            path
        } else if reference_path.starts_with(&self.partials) {
            self.root.join(reference_path)
        } else {
            containing_dir.join(reference_path)
        };

        normalize(&joined)
    }

    /// Display form of `path`: relative to the source root when inside it.
    pub fn display<'p>(&self, path: &'p Path) -> std::path::Display<'p> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// `..` at the filesystem root is dropped; leading `..` of a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
