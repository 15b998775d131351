//! Directive scanning.
//!
//! Each supported include syntax is an independent [`Matcher`]. The
//! [`Scanner`] runs them side by side and merges their results
//! leftmost-match-wins, resuming after the winning span so two syntaxes can
//! never claim overlapping text.
//!
//! | Syntax    | Forms                                                           |
//! |-----------|-----------------------------------------------------------------|
//! | `Comment` | `<!-- @include head -->`, `<!-- @@include "head" -->`, `<!-- @@include("head") -->` |
//! | `Call`    | `@@include("head")`, `@@include('head')`, `@@include(head)`     |
//! | `Bare`    | `@@include _partials/head.html`                                 |

use regex::Regex;
use std::{ops::Range, sync::LazyLock};

// ============================================================================
// Patterns
// ============================================================================

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<!--\s*@@?include"#,
        r#"(?:\s*\(\s*(?:"([^"]+)"|'([^']+)'|([^\s"')][^)]*?))\s*\)"#,
        r#"|\s+(?:"([^"]+)"|'([^']+)'|([^\s"'][^\s]*?)))"#,
        r#"\s*-->"#,
    ))
    .expect("comment include pattern is valid")
});

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@@include\s*\(\s*(?:"([^"]+)"|'([^']+)'|([^\s"')][^)]*?))\s*\)"#)
        .expect("call include pattern is valid")
});

static BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@@include\s+(?:"([^"]+)"|'([^']+)'|([^\s>"'(][^\s>]*))"#)
        .expect("bare include pattern is valid")
});

// ============================================================================
// Types
// ============================================================================

/// Which include syntax recognized a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Comment,
    Call,
    Bare,
}

/// One include directive found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'t> {
    /// Target as written, without quotes or surrounding whitespace.
    pub reference: &'t str,
    /// Byte range of the whole directive in the scanned text.
    pub span: Range<usize>,
    pub syntax: Syntax,
}

/// A strategy that finds the next directive of one syntax.
pub trait Matcher: Send + Sync {
    /// Find the first directive starting at or after `offset`.
    fn find_at<'t>(&self, text: &'t str, offset: usize) -> Option<Directive<'t>>;
}

/// Matcher backed by a regex whose first non-empty capture group is the reference.
pub struct RegexMatcher {
    syntax: Syntax,
    regex: &'static Regex,
}

impl RegexMatcher {
    pub const fn new(syntax: Syntax, regex: &'static Regex) -> Self {
        Self { syntax, regex }
    }

    pub fn comment() -> Self {
        Self::new(Syntax::Comment, &COMMENT_RE)
    }

    pub fn call() -> Self {
        Self::new(Syntax::Call, &CALL_RE)
    }

    pub fn bare() -> Self {
        Self::new(Syntax::Bare, &BARE_RE)
    }
}

impl Matcher for RegexMatcher {
    fn find_at<'t>(&self, text: &'t str, mut offset: usize) -> Option<Directive<'t>> {
        while let Some(caps) = self.regex.captures_at(text, offset) {
            let whole = caps.get(0)?;
            let reference = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().trim())
                .next()
                .unwrap_or_default();

            // Quoted whitespace only: not a reference, keep looking
            if reference.is_empty() {
                offset = whole.end();
                continue;
            }

            return Some(Directive {
                reference,
                span: whole.range(),
                syntax: self.syntax,
            });
        }
        None
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// Ordered set of matchers merged leftmost-match-wins.
///
/// On a tie (same start offset) the matcher registered first wins.
pub struct Scanner {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::standard()
    }
}

impl Scanner {
    /// All supported syntaxes: comment, call, bare.
    pub fn standard() -> Self {
        Self::with_matchers(vec![
            Box::new(RegexMatcher::comment()),
            Box::new(RegexMatcher::call()),
            Box::new(RegexMatcher::bare()),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Lazily iterate over the directives of `text`, left to right.
    ///
    /// Calling this again restarts the scan from the beginning.
    pub fn directives<'s, 't>(&'s self, text: &'t str) -> Directives<'s, 't> {
        Directives {
            matchers: &self.matchers,
            text,
            offset: 0,
            lookahead: vec![Lookahead::Unknown; self.matchers.len()],
        }
    }
}

/// Cached next match of one matcher.
#[derive(Debug, Clone)]
enum Lookahead<'t> {
    Unknown,
    Found(Directive<'t>),
    Exhausted,
}

/// Iterator returned by [`Scanner::directives`].
pub struct Directives<'s, 't> {
    matchers: &'s [Box<dyn Matcher>],
    text: &'t str,
    offset: usize,
    lookahead: Vec<Lookahead<'t>>,
}

impl<'t> Directives<'_, 't> {
    /// Re-query matchers whose cached match is unknown or starts before the cursor.
    fn refresh(&mut self) {
        for (matcher, slot) in self.matchers.iter().zip(self.lookahead.iter_mut()) {
            let stale = match slot {
                Lookahead::Unknown => true,
                Lookahead::Found(d) => d.span.start < self.offset,
                Lookahead::Exhausted => false,
            };
            if stale {
                *slot = match matcher.find_at(self.text, self.offset) {
                    Some(d) => Lookahead::Found(d),
                    None => Lookahead::Exhausted,
                };
            }
        }
    }
}

impl<'t> Iterator for Directives<'_, 't> {
    type Item = Directive<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.refresh();

        let winner = self
            .lookahead
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Lookahead::Found(d) => Some((i, d.span.start)),
                _ => None,
            })
            // min_by_key keeps the first of equal keys: registration order breaks ties
            .min_by_key(|&(_, start)| start)?
            .0;

        let Lookahead::Found(directive) =
            std::mem::replace(&mut self.lookahead[winner], Lookahead::Unknown)
        else {
            return None;
        };
        self.offset = directive.span.end;
        Some(directive)
    }
}
