//! Recursive include expansion.
//!
//! ```text
//! expand(page)
//!     │
//!     └── for each directive (left to right)
//!             │
//!             ├── on chain already  ──► cycle marker
//!             ├── read fails        ──► not-found / unreadable marker
//!             ├── chain full        ──► DepthExceeded (fatal)
//!             └── otherwise         ──► enter, expand fragment, leave, splice
//! ```
//!
//! Output is rebuilt from the spans between directives, so text coming from
//! the page itself is scanned once and inserted fragments are only scanned
//! while expanding that fragment.

use super::{
    resolver::PathResolver,
    scanner::Scanner,
    store::{PartialStore, Template},
    warning::{IncludeWarning, WarningKind},
};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("include depth limit of {max_depth} exceeded: {}", format_chain(.chain))]
    DepthExceeded { max_depth: usize, chain: Vec<PathBuf> },
}

pub(crate) fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Fully expanded text of one page plus the include failures met on the way.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub text: String,
    pub warnings: Vec<IncludeWarning>,
}

/// Active inclusion chain of one page.
///
/// The page itself anchors the chain but does not count towards the depth.
#[derive(Debug)]
struct Visitation {
    page: PathBuf,
    chain: Vec<PathBuf>,
}

impl Visitation {
    fn new(page: &Path) -> Self {
        Self {
            page: page.to_path_buf(),
            chain: Vec::new(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        self.page == path || self.chain.iter().any(|p| p == path)
    }

    fn depth(&self) -> usize {
        self.chain.len()
    }

    fn enter(&mut self, path: PathBuf) {
        self.chain.push(path);
    }

    fn leave(&mut self) {
        self.chain.pop();
    }

    /// Page, current chain and the fragment that did not fit.
    fn overflow(&self, next: &Path) -> Vec<PathBuf> {
        std::iter::once(self.page.clone())
            .chain(self.chain.iter().cloned())
            .chain(std::iter::once(next.to_path_buf()))
            .collect()
    }
}

/// Expands include directives using a scanner, a resolver and a partial store.
///
/// Holds no per-page state, so one expander serves every page of a build,
/// including from several threads at once.
pub struct Expander<'a> {
    scanner: &'a Scanner,
    resolver: &'a PathResolver,
    store: &'a PartialStore,
    max_depth: usize,
}

impl<'a> Expander<'a> {
    pub const fn new(
        scanner: &'a Scanner,
        resolver: &'a PathResolver,
        store: &'a PartialStore,
        max_depth: usize,
    ) -> Self {
        Self {
            scanner,
            resolver,
            store,
            max_depth,
        }
    }

    pub const fn resolver(&self) -> &'a PathResolver {
        self.resolver
    }

    /// Expand a page with a fresh inclusion chain.
    pub fn expand(&self, template: &Template) -> Result<Expansion, ExpandError> {
        let mut visitation = Visitation::new(template.path());
        let mut warnings = Vec::new();
        let text = self.expand_text(
            template.text(),
            template.path(),
            template.dir(),
            &mut visitation,
            &mut warnings,
        )?;
        Ok(Expansion { text, warnings })
    }

    fn expand_text(
        &self,
        text: &str,
        path: &Path,
        dir: &Path,
        visitation: &mut Visitation,
        warnings: &mut Vec<IncludeWarning>,
    ) -> Result<String, ExpandError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for directive in self.scanner.directives(text) {
            out.push_str(&text[last..directive.span.start]);
            last = directive.span.end;

            let resolved = self.resolver.resolve(directive.reference, dir);
            let warning = |kind| IncludeWarning {
                included_from: path.to_path_buf(),
                reference: directive.reference.to_owned(),
                resolved: resolved.clone(),
                kind,
            };

            if visitation.contains(&resolved) {
                let warning = warning(WarningKind::Cycle);
                out.push_str(&warning.marker(self.resolver));
                warnings.push(warning);
                continue;
            }

            let fragment = match self.store.read(&resolved) {
                Ok(fragment) => fragment,
                Err(err) => {
                    let kind = match err.kind() {
                        io::ErrorKind::NotFound => WarningKind::NotFound,
                        _ => WarningKind::Unreadable(err.to_string()),
                    };
                    let warning = warning(kind);
                    out.push_str(&warning.marker(self.resolver));
                    warnings.push(warning);
                    continue;
                }
            };

            // A missing fragment at the limit is a warning, not a depth error
            if visitation.depth() >= self.max_depth {
                return Err(ExpandError::DepthExceeded {
                    max_depth: self.max_depth,
                    chain: visitation.overflow(&resolved),
                });
            }

            let fragment_dir = resolved.parent().unwrap_or(dir).to_path_buf();
            visitation.enter(resolved.clone());
            let expanded = self.expand_text(&fragment, &resolved, &fragment_dir, visitation, warnings);
            visitation.leave();
            out.push_str(&expanded?);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Source tree in a temp dir with a `_partials/` folder.
    struct Site {
        dir: TempDir,
        scanner: Scanner,
        resolver: PathResolver,
        store: PartialStore,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("_partials")).unwrap();
            let resolver = PathResolver::new(dir.path(), "_partials", "html");
            Self {
                dir,
                scanner: Scanner::standard(),
                resolver,
                store: PartialStore::new(),
            }
        }

        fn write(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn expand_with_depth(&self, page: &str, max_depth: usize) -> Result<Expansion, ExpandError> {
            let expander = Expander::new(&self.scanner, &self.resolver, &self.store, max_depth);
            expander.expand(&Template::new(self.dir.path().join("index.html"), page))
        }

        fn expand(&self, page: &str) -> Expansion {
            self.expand_with_depth(page, 10).unwrap()
        }
    }

    #[test]
    fn test_no_directives_is_identity() {
        let site = Site::new();
        for text in ["", "<html><body>plain</body></html>", "@include not-a-directive", "é ü 😀"] {
            let expansion = site.expand(text);
            assert_eq!(expansion.text, text);
            assert!(expansion.warnings.is_empty());
        }
    }

    #[test]
    fn test_head_and_footer() {
        let site = Site::new();
        site.write("_partials/head.html", "<head></head>");
        site.write("_partials/footer.html", "<footer></footer>");

        let expansion = site.expand("<!-- @include head -->Hello<!-- @include footer -->");
        assert_eq!(expansion.text, "<head></head>Hello<footer></footer>");
        assert!(expansion.warnings.is_empty());
    }

    #[test]
    fn test_nested_fragments_expand_fully() {
        let site = Site::new();
        site.write("_partials/layout.html", "<main>@@include(\"nav\")</main>");
        site.write("_partials/nav.html", "<nav>@@include _partials/links.html</nav>");
        site.write("_partials/links.html", "<a></a>");

        let expansion = site.expand("@@include('layout')");
        assert_eq!(expansion.text, "<main><nav><a></a></nav></main>");
        assert!(!expansion.text.contains("@@include"));
    }

    #[test]
    fn test_relative_fragment_beside_nested_fragment() {
        let site = Site::new();
        site.write("_partials/blog/card.html", "<article>@@include(./meta.html)</article>");
        site.write("_partials/blog/meta.html", "<time></time>");

        let expansion = site.expand("@@include(\"_partials/blog/card.html\")");
        assert_eq!(expansion.text, "<article><time></time></article>");
    }

    #[test]
    fn test_self_inclusion_is_cycle() {
        let site = Site::new();
        site.write("_partials/a.html", "A[@@include(\"a\")]");

        let expansion = site.expand("@@include(\"a\")");
        assert_eq!(expansion.warnings.len(), 1);
        assert_eq!(expansion.warnings[0].kind, WarningKind::Cycle);
        assert_eq!(
            expansion.warnings[0].included_from,
            site.dir.path().join("_partials/a.html")
        );
        assert_eq!(
            expansion.text,
            "A[<!-- quilt: include cycle: \"a\" (_partials/a.html) -->]"
        );
    }

    #[test]
    fn test_transitive_cycle() {
        let site = Site::new();
        site.write("_partials/a.html", "a(@@include(\"b\"))");
        site.write("_partials/b.html", "b(@@include(\"a\"))");

        let expansion = site.expand("@@include(\"a\")");
        assert_eq!(expansion.warnings.len(), 1);
        assert_eq!(expansion.warnings[0].kind, WarningKind::Cycle);
        assert!(expansion.text.starts_with("a(b(<!-- quilt: include cycle"));
        assert!(expansion.text.ends_with("))"));
    }

    #[test]
    fn test_page_including_itself_is_cycle() {
        let site = Site::new();
        let expansion = site.expand("x @@include(\"/index.html\")");
        assert_eq!(expansion.warnings.len(), 1);
        assert_eq!(expansion.warnings[0].kind, WarningKind::Cycle);
    }

    #[test]
    fn test_siblings_may_share_fragment() {
        let site = Site::new();
        site.write("_partials/hr.html", "<hr>");
        site.write("_partials/section.html", "<section>@@include(\"hr\")</section>");

        let expansion = site.expand("@@include(\"hr\")@@include(\"hr\")@@include(\"section\")@@include(\"section\")");
        assert!(expansion.warnings.is_empty());
        assert_eq!(
            expansion.text,
            "<hr><hr><section><hr></section><section><hr></section>"
        );
    }

    #[test]
    fn test_missing_partial_marker_and_warning() {
        let site = Site::new();
        let expansion = site.expand("before @@include(\"missing\") after");

        assert_eq!(expansion.warnings.len(), 1);
        let warning = &expansion.warnings[0];
        assert_eq!(warning.kind, WarningKind::NotFound);
        assert_eq!(warning.reference, "missing");
        assert_eq!(warning.resolved, site.dir.path().join("_partials/missing.html"));
        assert_eq!(
            expansion.text,
            "before <!-- quilt: include not found: \"missing\" (_partials/missing.html) --> after"
        );
    }

    #[test]
    fn test_directory_target_is_unreadable() {
        let site = Site::new();
        fs::create_dir_all(site.dir.path().join("_partials/dir.html")).unwrap();

        let expansion = site.expand("@@include(\"dir\")");
        assert_eq!(expansion.warnings.len(), 1);
        assert!(matches!(expansion.warnings[0].kind, WarningKind::Unreadable(_)));
        assert!(expansion.text.contains("include unreadable"));
    }

    #[test]
    fn test_inserted_text_not_rescanned_as_page_text() {
        let site = Site::new();
        // Fragment produces text that only becomes directive-shaped when joined
        // with the page's own characters; nothing is rescanned after splicing.
        site.write("_partials/at.html", "@@incl");
        let expansion = site.expand("@@include(\"at\")ude(\"x\")");
        assert_eq!(expansion.text, "@@include(\"x\")");
        assert!(expansion.warnings.is_empty());
    }

    /// Chain of `n` nested partials: p1 includes p2 ... includes pn.
    fn write_chain(site: &Site, n: usize) {
        for i in 1..=n {
            let body = if i < n {
                format!("{i}>@@include(\"p{}\")", i + 1)
            } else {
                format!("{i}.")
            };
            site.write(&format!("_partials/p{i}.html"), &body);
        }
    }

    #[test]
    fn test_depth_bound_allows_max_depth() {
        let site = Site::new();
        write_chain(&site, 10);
        let expansion = site.expand_with_depth("@@include(\"p1\")", 10).unwrap();
        assert_eq!(expansion.text, "1>2>3>4>5>6>7>8>9>10.");
    }

    #[test]
    fn test_depth_bound_exceeded_is_error() {
        let site = Site::new();
        write_chain(&site, 11);
        let err = site.expand_with_depth("@@include(\"p1\")", 10).unwrap_err();

        let ExpandError::DepthExceeded { max_depth, chain } = err;
        assert_eq!(max_depth, 10);
        // page + 10 entered partials + the one that did not fit
        assert_eq!(chain.len(), 12);
        assert_eq!(chain.last().unwrap(), &site.dir.path().join("_partials/p11.html"));
    }

    #[test]
    fn test_missing_fragment_at_depth_limit_is_warning() {
        let site = Site::new();
        site.write("_partials/outer.html", "[@@include(\"gone\")]");

        let expansion = site.expand_with_depth("@@include(\"outer\")", 1).unwrap();

        assert_eq!(expansion.warnings.len(), 1);
        assert_eq!(expansion.warnings[0].kind, WarningKind::NotFound);
        assert!(expansion.text.starts_with("[<!-- quilt: include not found: \"gone\""));
    }

    #[test]
    fn test_warnings_keep_document_order() {
        let site = Site::new();
        site.write("_partials/wrap.html", "@@include(\"inner-missing\")");

        let expansion = site.expand("@@include(\"first\")@@include(\"wrap\")@@include(\"last\")");
        let refs: Vec<_> = expansion.warnings.iter().map(|w| w.reference.as_str()).collect();
        assert_eq!(refs, ["first", "inner-missing", "last"]);
    }
}
