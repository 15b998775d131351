//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn partials() -> PathBuf {
        "_partials".into()
    }

    pub fn assets() -> PathBuf {
        "assets".into()
    }

    /// Loose root files copied verbatim next to the pages.
    pub fn extra_files() -> Vec<PathBuf> {
        ["manifest.webmanifest", "sw.js", "robots.txt", "sitemap.xml"]
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }

    pub fn max_depth() -> usize {
        10
    }

    pub fn default_extension() -> String {
        "html".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}
