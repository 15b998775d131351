//! Utility modules shared across the build pipeline.

pub mod minify;
pub mod path;
