//! Recoverable include failures and their inline markers.

use super::resolver::PathResolver;
use std::path::PathBuf;

/// Why a directive could not be replaced by its fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    NotFound,
    /// Exists but could not be read; carries the io error message.
    Unreadable(String),
    /// The fragment is already on the active inclusion chain.
    Cycle,
}

/// A directive that was replaced by a diagnostic marker instead of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWarning {
    /// Document that contains the directive (page or fragment).
    pub included_from: PathBuf,
    pub reference: String,
    pub resolved: PathBuf,
    pub kind: WarningKind,
}

impl IncludeWarning {
    /// One-line description with paths relative to the source root.
    pub fn describe(&self, resolver: &PathResolver) -> String {
        let target = resolver.display(&self.resolved);
        match &self.kind {
            WarningKind::NotFound => {
                format!("include not found: \"{}\" ({target})", self.reference)
            }
            WarningKind::Unreadable(err) => {
                format!("include unreadable: \"{}\" ({target}): {err}", self.reference)
            }
            WarningKind::Cycle => format!("include cycle: \"{}\" ({target})", self.reference),
        }
    }

    /// HTML comment spliced in place of the directive.
    pub fn marker(&self, resolver: &PathResolver) -> String {
        format!("<!-- quilt: {} -->", inert(&self.describe(resolver)))
    }
}

/// Escape sequences that would close the marker comment early.
fn inert(text: &str) -> String {
    text.replace("-->", "--&gt;").replace("--!>", "--!&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(reference: &str, kind: WarningKind) -> IncludeWarning {
        IncludeWarning {
            included_from: PathBuf::from("/site/src/index.html"),
            reference: reference.into(),
            resolved: PathBuf::from(format!("/site/src/_partials/{reference}.html")),
            kind,
        }
    }

    #[test]
    fn test_marker_not_found() {
        let resolver = PathResolver::new("/site/src", "_partials", "html");
        let marker = warning("missing", WarningKind::NotFound).marker(&resolver);
        assert_eq!(
            marker,
            "<!-- quilt: include not found: \"missing\" (_partials/missing.html) -->"
        );
    }

    #[test]
    fn test_marker_cycle_and_unreadable() {
        let resolver = PathResolver::new("/site/src", "_partials", "html");
        let cycle = warning("a", WarningKind::Cycle).marker(&resolver);
        assert!(cycle.starts_with("<!-- quilt: include cycle: \"a\""));

        let unreadable =
            warning("b", WarningKind::Unreadable("permission denied".into())).marker(&resolver);
        assert!(unreadable.contains("include unreadable"));
        assert!(unreadable.contains("permission denied"));
    }

    #[test]
    fn test_marker_stays_one_comment() {
        let resolver = PathResolver::new("/site/src", "_partials", "html");
        let marker = warning("evil-->x", WarningKind::NotFound).marker(&resolver);
        assert_eq!(marker.matches("-->").count(), 1);
        assert!(marker.ends_with(" -->"));
    }
}
