//! Partial include engine.
//!
//! - **scanner**: find include directives (several syntaxes, leftmost wins)
//! - **resolver**: map a reference to a candidate file path
//! - **store**: page templates and the per-build fragment cache
//! - **expander**: recursive expansion with cycle detection and a depth bound
//! - **warning**: recoverable failures and their inline markers
//!
//! # Flow
//!
//! ```text
//! Template ──► Scanner ──► PathResolver ──► PartialStore ──► Expander ──► Expansion
//!                 ▲                                              │
//!                 └──────────── fragment text (recursion) ◄──────┘
//! ```

pub mod expander;
pub mod resolver;
pub mod scanner;
pub mod store;
pub mod warning;

pub use expander::{ExpandError, Expander, Expansion};
pub use resolver::PathResolver;
pub use scanner::Scanner;
pub use store::{PartialStore, Template};
pub use warning::{IncludeWarning, WarningKind};
