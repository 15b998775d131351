//! Build report: per-page outcomes collected over one build.
//!
//! The report is filled by the orchestrator and logged once, after the build
//! finished, so every warning shows up together in one block.

use crate::{include::{IncludeWarning, PathResolver}, log};
use std::path::{Path, PathBuf};

/// Result of building one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Page path relative to the source root.
    pub page: PathBuf,
    /// Written file.
    pub output: PathBuf,
    pub warnings: Vec<IncludeWarning>,
}

impl PageOutcome {
    /// True if every include resolved.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Ordered outcomes of one build invocation.
#[derive(Debug)]
pub struct BuildReport {
    resolver: PathResolver,
    pages: Vec<PageOutcome>,
    assets: usize,
}

impl BuildReport {
    /// Empty report; `resolver` renders warning paths relative to the source root.
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            pages: Vec::new(),
            assets: 0,
        }
    }

    pub fn push_page(&mut self, outcome: PageOutcome) {
        self.pages.push(outcome);
    }

    pub fn set_assets(&mut self, copied: usize) {
        self.assets = copied;
    }

    pub fn pages(&self) -> &[PageOutcome] {
        &self.pages
    }

    pub const fn assets(&self) -> usize {
        self.assets
    }

    /// Every warning, paired with the page it was recorded for, in build order.
    pub fn warnings(&self) -> impl Iterator<Item = (&Path, &IncludeWarning)> {
        self.pages
            .iter()
            .flat_map(|p| p.warnings.iter().map(move |w| (p.page.as_path(), w)))
    }

    pub fn warning_count(&self) -> usize {
        self.pages.iter().map(|p| p.warnings.len()).sum()
    }

    /// Warning lines as shown to the operator.
    ///
    /// Warnings raised inside a fragment name both the page and the fragment.
    pub fn warning_lines(&self) -> Vec<String> {
        self.warnings()
            .map(|(page, warning)| {
                let from = self.resolver.display(&warning.included_from).to_string();
                let page = page.display().to_string();
                let location = if from == page {
                    page
                } else {
                    format!("{page} (via {from})")
                };
                format!("{location}: {}", warning.describe(&self.resolver))
            })
            .collect()
    }

    /// Log per-page status, then all warnings, then totals.
    pub fn log_summary(&self) {
        for outcome in &self.pages {
            match outcome.warnings.len() {
                0 => log!("page"; "{}", outcome.page.display()),
                n => log!("page"; "{} ({n} warning{})", outcome.page.display(), plural(n)),
            }
        }

        let lines = self.warning_lines();
        if !lines.is_empty() {
            log!("warn"; "{}", lines.join("\n"));
        }

        let count = self.warning_count();
        log!(
            "build";
            "done: {} page{}, {} asset{}, {count} warning{}",
            self.pages.len(),
            plural(self.pages.len()),
            self.assets,
            plural(self.assets),
            plural(count)
        );
    }
}

const fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
