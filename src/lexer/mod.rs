//! Lexical analysis for expression fragments.
//!
//! This module converts one operand fragment (the text of a single token
//! slot, e.g. `"a + Square(b)"`) into a stream of [`Token`]s. Glyph folding
//! happens before this, in [`crate::normalizer::substitute_glyphs`], so the
//! lexer only sees ASCII operators.
//!
//! ## Example
//!
//! ```
//! use pseudoblocks::lexer::{lex, TokenKind};
//!
//! let tokens = lex("x + 1").unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! assert_eq!(tokens[2].text, "1");
//! ```
//!
//! ## Design Notes
//!
//! The lexer is built on the [`logos`](https://docs.rs/logos) crate. We wrap
//! it to attach spans and source text to each token and to turn unknown
//! characters into a [`LexError`] instead of silently dropping them, since a
//! fragment that does not lex must block code generation.

mod token;

pub use token::{Token, TokenKind};

use logos::Logos;
use thiserror::Error;

/// A character the fragment lexer does not recognise.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unexpected character `{ch}` at offset {offset}")]
pub struct LexError {
    pub ch: char,
    pub offset: usize,
}

/// The lexer for expression fragments.
///
/// Wraps a `logos` lexer and yields `Result<Token, LexError>`.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, TokenKind>,
    source: &'source str,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given fragment.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
        }
    }

    /// Get the original fragment.
    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Get the next token, if any.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        let kind = self.inner.next()?;
        let span = self.inner.span();
        Some(match kind {
            Ok(kind) => Ok(Token::new(kind, span, self.inner.slice())),
            Err(()) => Err(LexError {
                ch: self.source[span.start..].chars().next().unwrap_or('\u{fffd}'),
                offset: span.start,
            }),
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Lex a whole fragment, failing on the first unknown character.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

/// Returns true if `text` is exactly one token of `kind`.
pub fn is_single(text: &str, kind: TokenKind) -> bool {
    matches!(lex(text.trim()).as_deref(), Ok([token]) if token.kind == kind && token.text == text.trim())
}
