//! Site configuration management for `quilt.toml`.
//!
//! The file is optional: without it every field takes its default and the
//! layout matches the conventional `src/` → `dist/` project.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[build]`   | Source/output layout, includes, minification    |
//! | `[serve]`   | Development server (port, interface, watch)     |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "dist"
//! partials = "_partials"
//! extra_files = ["manifest.webmanifest", "sw.js"]
//!
//! [serve]
//! port = 5277
//! ```

mod build;
pub mod defaults;
mod error;
mod handle;
mod serve;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use handle::{cfg, init_config, reload_config};
pub use serve::ServeConfig;

use crate::{
    cli::{BuildArgs, Cli, Commands},
    utils::path::normalize_path,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing quilt.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading, may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load, apply CLI overrides and validate.
    ///
    /// A missing config file is not an error: defaults apply.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.update_path_with_root(&root, cli);
        self.update_build_args(cli.command.build_args());

        if let Commands::Serve {
            interface,
            port,
            watch,
            ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    fn update_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.recursive, args.recursive.as_ref());

        let ext = self.build.default_extension.trim_start_matches('.');
        self.build.default_extension = ext.to_owned();
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve source/output against the root and normalize them to absolute paths.
    ///
    /// `partials`, `assets` and `extra_files` stay relative to the source root.
    fn update_path_with_root(&mut self, root: &Path, cli: &Cli) {
        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let root = normalize_path(root);
        self.set_root(&root);

        self.config_path = normalize_path(&root.join(&cli.config));
        self.build.source = normalize_path(&root.join(&self.build.source));
        self.build.output = normalize_path(&root.join(&self.build.output));
    }

    /// Validate settings that would otherwise surface as confusing build errors.
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;

        if build.max_depth == 0 {
            bail!(ConfigError::Validation(
                "[build.max_depth] must be at least 1".into()
            ));
        }

        if build.default_extension.is_empty() {
            bail!(ConfigError::Validation(
                "[build.default_extension] must not be empty".into()
            ));
        }

        for (field, path) in [("partials", &build.partials), ("assets", &build.assets)] {
            if path.as_os_str().is_empty() || path.is_absolute() {
                bail!(ConfigError::Validation(format!(
                    "[build.{field}] must be a non-empty path relative to [build.source]"
                )));
            }
        }

        if let Some(file) = build.extra_files.iter().find(|p| p.is_absolute()) {
            bail!(ConfigError::Validation(format!(
                "[build.extra_files] entry `{}` must be relative to [build.source]",
                file.display()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
