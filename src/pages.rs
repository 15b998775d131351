//! Page enumeration and the per-page build driver.
//!
//! Every page is expanded with a fresh inclusion chain, optionally minified
//! and written to the mirrored location under the output directory.

use crate::{
    build::BuildError,
    config::BuildConfig,
    include::{ExpandError, Expander, Template},
    report::PageOutcome,
    utils::minify::minify,
};
use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use walkdir::{DirEntry, WalkDir};

/// Collect page templates, sorted by path.
///
/// Only the source root itself is scanned unless `recursive` is set. The
/// partials and assets directories never contribute pages.
pub fn collect_pages(config: &BuildConfig) -> Vec<PathBuf> {
    let partials = config.partials_dir();
    let assets = config.assets_dir();
    let max_depth = if config.recursive { usize::MAX } else { 1 };

    WalkDir::new(&config.source)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !e.file_type().is_dir()
                || !(e.path() == partials || e.path() == assets || is_hidden(e))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_html(e.path()))
        .map(DirEntry::into_path)
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}

/// Build all pages in parallel.
///
/// Once a page fails fatally, pages that have not started yet are skipped.
/// Outcomes keep page order; the first fatal error in page order is returned.
pub fn build_pages(
    pages: &[PathBuf],
    config: &BuildConfig,
    expander: &Expander,
) -> Result<Vec<PageOutcome>, BuildError> {
    let has_error = AtomicBool::new(false);

    let results: Vec<_> = pages
        .par_iter()
        .map(|page| {
            if has_error.load(Ordering::Relaxed) {
                return Err(BuildError::Aborted);
            }
            let result = build_page(page, config, expander);
            if result.is_err() {
                has_error.store(true, Ordering::Relaxed);
            }
            result
        })
        .collect();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(BuildError::Aborted) => {}
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(outcomes),
    }
}

/// Read, expand, minify and write one page.
pub fn build_page(
    page: &Path,
    config: &BuildConfig,
    expander: &Expander,
) -> Result<PageOutcome, BuildError> {
    let root = expander.resolver().root();
    let rel = page.strip_prefix(root).unwrap_or(page).to_path_buf();

    let template = Template::read(page).map_err(|source| BuildError::PageUnreadable {
        page: rel.clone(),
        source,
    })?;

    let expansion = expander.expand(&template).map_err(|err| match err {
        ExpandError::DepthExceeded { max_depth, chain } => BuildError::DepthExceeded {
            page: rel.clone(),
            max_depth,
            chain: chain
                .iter()
                .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
                .collect(),
        },
    })?;

    let output = config.output.join(&rel);
    let html = minify(expansion.text.as_bytes(), config);
    write_page(&output, &html).map_err(|source| BuildError::Write {
        path: output.clone(),
        source,
    })?;

    Ok(PageOutcome {
        page: rel,
        output,
        warnings: expansion.warnings,
    })
}

fn write_page(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
