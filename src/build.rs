//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── check source, clear output
//!     │
//!     ├── collect_pages() ──► build_pages()
//!     │                           │
//!     │                           └── expand (shared PartialStore) → minify → write
//!     │
//!     └── copy_assets() ──► assets dir + allow-listed loose files
//! ```
//!
//! Include failures never fail the build; they are collected into the
//! returned [`BuildReport`]. Everything in [`BuildError`] is fatal.

use crate::{
    assets::copy_assets,
    config::{BuildConfig, SiteConfig},
    include::{Expander, PartialStore, PathResolver, Scanner, expander::format_chain, resolver::normalize},
    log,
    pages::{build_pages, collect_pages},
    report::BuildReport,
    utils::path::paths_overlap,
};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error(
        "refusing to clear output directory {}: it overlaps the source directory {}",
        .output.display(),
        .input.display()
    )]
    UnsafeOutput { output: PathBuf, input: PathBuf },

    #[error("failed to clear output directory {}", .path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read page {}", .page.display())]
    PageUnreadable {
        page: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "{}: include depth limit of {max_depth} exceeded: {}",
        .page.display(),
        format_chain(.chain)
    )]
    DepthExceeded {
        page: PathBuf,
        max_depth: usize,
        chain: Vec<PathBuf>,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {}", .path.display())]
    Assets {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("build aborted")]
    Aborted,
}

/// Build the entire site: expand every page, then copy assets.
///
/// The output directory is removed and recreated first, so nothing from a
/// previous build survives.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let build = &config.build;

    if !build.source.is_dir() {
        return Err(BuildError::SourceMissing(build.source.clone()));
    }
    prepare_output(build)?;

    let pages = collect_pages(build);
    log!("build"; "{} page{} in {}", pages.len(), if pages.len() == 1 { "" } else { "s" }, build.source.display());

    let scanner = Scanner::standard();
    let resolver = PathResolver::from_config(build);
    let store = PartialStore::new();
    let expander = Expander::new(&scanner, &resolver, &store, build.max_depth);

    let outcomes = build_pages(&pages, build, &expander)?;
    let copied = copy_assets(build)?;

    let mut report = BuildReport::new(resolver);
    for outcome in outcomes {
        report.push_page(outcome);
    }
    report.set_assets(copied);

    Ok(report)
}

/// Remove and recreate the output directory, unless it overlaps the source.
fn prepare_output(build: &BuildConfig) -> Result<(), BuildError> {
    let output = normalize(&build.output);
    let input = normalize(&build.source);

    if paths_overlap(&output, &input) {
        return Err(BuildError::UnsafeOutput { output, input });
    }

    let clear = |source| BuildError::Clear {
        path: output.clone(),
        source,
    };
    if output.exists() {
        fs::remove_dir_all(&output).map_err(clear)?;
    }
    fs::create_dir_all(&output).map_err(clear)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn site() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.source = dir.path().join("src");
        config.build.output = dir.path().join("dist");
        fs::create_dir_all(config.build.source.join("_partials")).unwrap();
        (dir, config)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_head_and_footer() {
        let (_dir, config) = site();
        let src = &config.build.source;
        write(src, "index.html", "<!-- @include head -->Hello<!-- @include footer -->");
        write(src, "_partials/head.html", "<head></head>");
        write(src, "_partials/footer.html", "<footer></footer>");

        let report = build_site(&config).unwrap();

        assert_eq!(report.warning_count(), 0);
        assert_eq!(
            fs::read_to_string(config.build.output.join("index.html")).unwrap(),
            "<head></head>Hello<footer></footer>"
        );
    }

    #[test]
    fn test_missing_partial_is_a_warning() {
        let (_dir, config) = site();
        write(&config.build.source, "index.html", "@@include(\"missing\")");

        let report = build_site(&config).unwrap();
        let html = fs::read_to_string(config.build.output.join("index.html")).unwrap();

        assert_eq!(report.warning_count(), 1);
        assert_eq!(html.matches("<!-- quilt: include not found").count(), 1);
        assert_eq!(
            html,
            "<!-- quilt: include not found: \"missing\" (_partials/missing.html) -->"
        );
    }

    #[test]
    fn test_latin1_page_and_partial_still_build() {
        let (_dir, config) = site();
        let src = &config.build.source;
        fs::write(src.join("_partials/nav.html"), b"<nav>Cal\xe7ados</nav>").unwrap();
        fs::write(src.join("a.html"), b"Promo\xe7\xe3o @@include(\"nav\")").unwrap();
        write(src, "b.html", "ok");

        let report = build_site(&config).unwrap();
        let a = fs::read_to_string(config.build.output.join("a.html")).unwrap();

        assert_eq!(report.warning_count(), 0);
        assert_eq!(a, "Promo\u{fffd}\u{fffd}o <nav>Cal\u{fffd}ados</nav>");
        assert!(config.build.output.join("b.html").is_file());
    }

    #[test]
    fn test_source_missing() {
        let (_dir, mut config) = site();
        config.build.source = config.build.source.join("nope");

        let err = build_site(&config).unwrap_err();
        assert!(matches!(err, BuildError::SourceMissing(_)));
    }

    #[test]
    fn test_output_inside_source_refused() {
        let (_dir, mut config) = site();
        config.build.output = config.build.source.join("dist");
        write(&config.build.source, "index.html", "keep");

        let err = build_site(&config).unwrap_err();
        assert!(matches!(err, BuildError::UnsafeOutput { .. }));
        assert!(config.build.source.join("index.html").exists());
    }

    #[test]
    fn test_output_equal_or_containing_source_refused() {
        let (dir, mut config) = site();

        config.build.output = config.build.source.clone();
        assert!(matches!(
            build_site(&config).unwrap_err(),
            BuildError::UnsafeOutput { .. }
        ));

        config.build.output = dir.path().to_path_buf();
        assert!(matches!(
            build_site(&config).unwrap_err(),
            BuildError::UnsafeOutput { .. }
        ));
        assert!(config.build.source.is_dir());
    }

    #[test]
    fn test_output_is_cleared() {
        let (_dir, config) = site();
        write(&config.build.source, "index.html", "fresh");
        write(&config.build.output, "stale.html", "old");

        build_site(&config).unwrap();

        assert!(!config.build.output.join("stale.html").exists());
        assert!(config.build.output.join("index.html").exists());
    }

    #[test]
    fn test_depth_exceeded_fails_build() {
        let (_dir, config) = site();
        let src = &config.build.source;
        for i in 0..11 {
            write(src, &format!("_partials/p{i}.html"), &format!("@@include(\"p{}\")", i + 1));
        }
        write(src, "_partials/p11.html", "bottom");
        write(src, "index.html", "@@include(\"p0\")");

        let err = build_site(&config).unwrap_err();
        match err {
            BuildError::DepthExceeded { page, max_depth, chain } => {
                assert_eq!(page, PathBuf::from("index.html"));
                assert_eq!(max_depth, 10);
                assert_eq!(chain.len(), 12);
                assert_eq!(chain[0], PathBuf::from("index.html"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_recursive_pages_and_assets() {
        let (_dir, mut config) = site();
        config.build.recursive = true;
        let src = &config.build.source;
        write(src, "_partials/nav.html", "<nav></nav>");
        write(src, "index.html", "@@include(\"nav\")");
        write(src, "docs/guide.html", "@@include(\"nav\")@@include(\"../footer.html\")");
        write(src, "footer.html", "<footer></footer>");
        write(src, "assets/app.css", "body{}");
        write(src, "robots.txt", "User-agent: *");

        let report = build_site(&config).unwrap();
        let out = &config.build.output;

        assert_eq!(report.pages().len(), 3);
        assert_eq!(report.assets(), 2);
        assert_eq!(
            fs::read_to_string(out.join("docs/guide.html")).unwrap(),
            "<nav></nav><footer></footer>"
        );
        assert!(out.join("assets/app.css").is_file());
        assert!(out.join("robots.txt").is_file());
        assert!(!out.join("_partials").exists());
    }

    #[test]
    fn test_error_messages() {
        let err = BuildError::DepthExceeded {
            page: "index.html".into(),
            max_depth: 1,
            chain: vec!["index.html".into(), "_partials/a.html".into(), "_partials/b.html".into()],
        };
        assert_eq!(
            err.to_string(),
            "index.html: include depth limit of 1 exceeded: index.html -> _partials/a.html -> _partials/b.html"
        );
    }
}
