//! Token navigation utilities for the expression parser.

use crate::lexer::{Token, TokenKind};

use super::{ExprError, Parser};

impl<'a> Parser<'a> {
    /// Returns the current token without consuming it.
    pub(super) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current)
    }

    /// Returns the kind of the current token.
    pub(super) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Consumes and returns the current token.
    pub(super) fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.current)?;
        self.current += 1;
        Some(token)
    }

    /// Checks if the current token matches the expected kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consumes the current token if it matches, returns true if consumed.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` or fails.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, ExprError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.current += 1;
                Ok(token)
            }
            Some(token) => Err(ExprError::unexpected(
                &token.text,
                format!("`{kind}`"),
                token.span.start,
            )),
            None => Err(ExprError::eof(format!("`{kind}`"))),
        }
    }

    /// Offset just past the previous token.
    pub(super) fn previous_end(&self) -> usize {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }
}
