//! File system watcher for live rebuilds.
//!
//! Monitors the source root and the config file. Every settled batch of
//! changes triggers one full rebuild on the watcher thread, so rebuilds never
//! overlap: events arriving mid-build wait in the channel and are debounced
//! into the next rebuild.
//!
//! ```text
//! notify events ──► Debouncer (300ms) ──► handle_changes()
//!                                             │
//!                                             ├── quilt.toml changed? reload config, re-watch
//!                                             └── build_site() ──► report + status line
//! ```

use crate::{
    build::build_site,
    config::{SiteConfig, cfg, reload_config},
    log,
    logger::WatchStatus,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{RecvTimeoutError, channel},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

/// Paths named in a trigger message before the rest is summarized.
const MAX_TRIGGER_PATHS: usize = 3;

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with('#')
}

/// Batches rapid file events into one rebuild.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Drain pending paths, sorted for stable log output.
    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// Changed paths relative to the project root, for the status line.
fn describe_trigger(paths: &[PathBuf], root: &Path) -> String {
    let mut names: Vec<_> = paths
        .iter()
        .take(MAX_TRIGGER_PATHS)
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    if paths.len() > MAX_TRIGGER_PATHS {
        names.push(format!("+{} more", paths.len() - MAX_TRIGGER_PATHS));
    }
    names.join(", ")
}

/// Rebuild after a settled batch of changes.
fn handle_changes(
    paths: &[PathBuf],
    watcher: &mut impl Watcher,
    watched: &mut Vec<PathBuf>,
    status: &mut WatchStatus,
) {
    let mut config = cfg();
    let trigger = describe_trigger(paths, config.get_root());

    if paths.iter().any(|p| normalize_path(p) == config.config_path) {
        log!("watch"; "config changed, reloading...");
        config = match reload_config() {
            Ok(config) => config,
            Err(e) => {
                status.error("config reload failed", &format!("{e:#}"));
                return;
            }
        };
        if let Err(e) = rewatch(watcher, watched, &config) {
            log!("watch"; "{e:#}");
        }
    }

    match build_site(&config) {
        Ok(report) => {
            report.log_summary();
            status.success(&format!("rebuilt ({trigger})"));
        }
        Err(e) => {
            let err = anyhow::Error::from(e);
            status.error(&format!("rebuild failed ({trigger})"), &format!("{err:#}"));
        }
    }
}

/// Watch the source root and the config file (if present).
fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<Vec<PathBuf>> {
    let mut watched = Vec::new();
    let targets = [
        (&config.build.source, RecursiveMode::Recursive),
        (&config.config_path, RecursiveMode::NonRecursive),
    ];

    for (path, mode) in targets {
        if !path.exists() {
            continue;
        }
        watcher
            .watch(path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        watched.push(path.clone());
    }

    let root = config.get_root();
    let names: Vec<_> = watched
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    log!("watch"; "watching {}", names.join(", "));

    Ok(watched)
}

/// Swap watches after a config reload moved the source root.
fn rewatch(watcher: &mut impl Watcher, watched: &mut Vec<PathBuf>, config: &SiteConfig) -> Result<()> {
    if watched.first() == Some(&config.build.source) {
        return Ok(());
    }
    for path in watched.drain(..) {
        watcher.unwatch(&path).ok();
    }
    *watched = setup_watchers(watcher, config)?;
    Ok(())
}

/// Start blocking file watcher with debouncing and live rebuild.
pub fn watch_for_changes_blocking() -> Result<()> {
    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    let mut watched = setup_watchers(&mut watcher, &cfg())?;

    let mut debouncer = Debouncer::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event),
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                handle_changes(&debouncer.take(), &mut watcher, &mut watched, &mut status);
            }
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}
