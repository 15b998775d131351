//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! Watch mode replaces the config when `quilt.toml` changes; builds already
//! running keep the `Arc` they loaded.
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! build_site(&c)?;  // Arc auto-derefs to &SiteConfig
//! ```

use super::SiteConfig;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage with atomic replacement support.
///
/// Initialized with default config, then replaced with loaded config in main.
pub static CONFIG: LazyLock<ArcSwap<SiteConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SiteConfig::default()));

/// Get current config as `Arc<SiteConfig>`.
#[inline]
pub fn cfg() -> Arc<SiteConfig> {
    CONFIG.load_full()
}

/// Initialize global config (called once at startup).
#[inline]
pub fn init_config(config: SiteConfig) {
    CONFIG.store(Arc::new(config));
}

/// Reload `quilt.toml` with the CLI arguments of the current config.
///
/// The old config remains valid for any readers that loaded it before this call.
pub fn reload_config() -> Result<Arc<SiteConfig>> {
    let cli = cfg()
        .cli
        .context("config was not initialized from the command line")?;

    let config = Arc::new(SiteConfig::load(cli)?);
    CONFIG.store(Arc::clone(&config));

    Ok(config)
}
