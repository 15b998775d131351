//! Asset copy: static files that bypass include expansion.
//!
//! Copies the assets directory recursively and the allow-listed loose files
//! of the source root (web manifest, service worker, robots, sitemap) into the
//! output tree unchanged.

use crate::{build::BuildError, config::BuildConfig};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Extensions never copied from the assets tree (notes and docs kept next to assets)
const IGNORED_EXTENSIONS: &[&str] = &["md"];

/// Collect all files from a directory recursively, sorted by path.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Copy assets and loose files; returns how many files were copied.
pub fn copy_assets(config: &BuildConfig) -> Result<usize, BuildError> {
    let assets_dir = config.assets_dir();
    let mut copied = 0;

    let assets = collect_all_files(&assets_dir).into_iter().filter(|p| {
        let ext = p.extension().and_then(|e| e.to_str()).unwrap_or_default();
        !IGNORED_EXTENSIONS.contains(&ext)
    });

    for path in assets {
        let rel = path.strip_prefix(&config.source).unwrap_or(&path);
        copy_file(&path, &config.output.join(rel))?;
        copied += 1;
    }

    for name in &config.extra_files {
        let path = config.source.join(name);
        if path.is_file() {
            copy_file(&path, &config.output.join(name))?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    let wrap = |source| BuildError::Assets {
        path: from.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(from, to).map_err(wrap)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BuildConfig) {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig {
            source: dir.path().join("src"),
            output: dir.path().join("dist"),
            ..BuildConfig::default()
        };
        fs::create_dir_all(&config.source).unwrap();
        (dir, config)
    }

    #[test]
    fn test_copy_assets_tree_and_allow_list() {
        let (_dir, config) = setup();
        let src = &config.source;
        fs::create_dir_all(src.join("assets/js")).unwrap();
        fs::write(src.join("assets/js/catalog.js"), "render()").unwrap();
        fs::write(src.join("assets/style.css"), "body{}").unwrap();
        fs::write(src.join("assets/.DS_Store"), "").unwrap();
        fs::write(src.join("assets/README.md"), "# assets").unwrap();
        fs::write(src.join("assets/js/NOTES.md"), "todo").unwrap();
        fs::write(src.join("sw.js"), "self.addEventListener()").unwrap();
        fs::write(src.join("manifest.webmanifest"), "{}").unwrap();
        fs::write(src.join("notes.txt"), "not copied").unwrap();

        let copied = copy_assets(&config).unwrap();
        let out = &config.output;

        assert_eq!(copied, 4);
        assert_eq!(fs::read_to_string(out.join("assets/js/catalog.js")).unwrap(), "render()");
        assert!(out.join("assets/style.css").is_file());
        assert!(out.join("sw.js").is_file());
        assert!(out.join("manifest.webmanifest").is_file());
        assert!(!out.join("assets/.DS_Store").exists());
        assert!(!out.join("assets/README.md").exists());
        assert!(!out.join("assets/js/NOTES.md").exists());
        assert!(!out.join("notes.txt").exists());
        assert!(!out.join("robots.txt").exists());
    }

    #[test]
    fn test_copy_assets_without_assets_dir() {
        let (_dir, config) = setup();
        assert_eq!(copy_assets(&config).unwrap(), 0);
    }

    #[test]
    fn test_collect_all_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let files = collect_all_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }
}
