//! `[build]` section configuration.
//!
//! Contains source/output layout, include resolution and minification settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in quilt.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"           # Page templates, partials and assets
/// output = "dist"          # Rendered site
/// partials = "_partials"   # Fragment directory, relative to source
/// max_depth = 10           # Nested include limit
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Source root holding page templates.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory. Cleared on every build.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Partials directory name, relative to the source root.
    ///
    /// Kept relative: the resolver compares it against the first component
    /// of include references.
    #[serde(default = "defaults::build::partials")]
    #[educe(Default = defaults::build::partials())]
    pub partials: PathBuf,

    /// Static assets directory, relative to the source root.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Loose files in the source root copied verbatim when present.
    #[serde(default = "defaults::build::extra_files")]
    #[educe(Default = defaults::build::extra_files())]
    pub extra_files: Vec<PathBuf>,

    /// Treat html files in subdirectories as pages too.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub recursive: bool,

    /// Maximum number of nested partials on one inclusion chain.
    #[serde(default = "defaults::build::max_depth")]
    #[educe(Default = defaults::build::max_depth())]
    pub max_depth: usize,

    /// Extension appended to bare partial names that have none.
    #[serde(default = "defaults::build::default_extension")]
    #[educe(Default = defaults::build::default_extension())]
    pub default_extension: String,

    /// Minify HTML output. Comments survive so diagnostics stay visible.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,
}

impl BuildConfig {
    /// Absolute partials directory.
    pub fn partials_dir(&self) -> PathBuf {
        self.source.join(&self.partials)
    }

    /// Absolute assets directory.
    pub fn assets_dir(&self) -> PathBuf {
        self.source.join(&self.assets)
    }
}
