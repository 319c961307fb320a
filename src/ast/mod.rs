//! Abstract Syntax Tree definitions for expression fragments.
//!
//! Statements live in the [`crate::model`] tree; each statement's token slots
//! hold expression *text*. That text is parsed on demand into the [`Expr`]
//! tree defined here, validated, and printed in a target's syntax.
//!
//! # Design Decisions
//!
//! - **Owned nodes**: expression nodes own their children (no lifetimes), so
//!   a parsed fragment can outlive the text it came from.
//! - **Span on every node**: byte ranges into the normalized fragment, used
//!   for error messages.
//! - **Groups preserved**: parentheses written by the user survive parsing,
//!   so rendering reproduces them.

mod expr;

pub use expr::*;

/// A byte range in a normalized fragment.
///
/// # Example
///
/// ```
/// use pseudoblocks::ast::Span;
///
/// let span = Span::new(0, 5);
/// assert_eq!(span.start, 0);
/// assert_eq!(span.end, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the start of the span (inclusive).
    pub start: usize,
    /// Byte offset of the end of the span (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span from start to end byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a span that covers both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}
