//! Expression error types.
//!
//! Everything that can be wrong with a single operand fragment: it does not
//! lex, does not parse, has unbalanced parentheses, uses a reserved word, or
//! calls a built-in with bad arguments. These errors are scoped to one
//! statement but still block generation of the whole program.

use thiserror::Error;

use crate::lexer::LexError;

/// An error in an expression fragment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    /// The fragment contains a character the lexer does not know.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A string literal missing its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString {
        /// Offset of the opening quote.
        offset: usize,
    },

    /// The fragment is empty where a value is required.
    #[error("missing value")]
    Empty,

    /// A token that cannot appear at this position.
    #[error("unexpected `{found}`, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },

    /// Input ended in the middle of an expression.
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: String },

    // === Bracket Errors ===
    /// More `(` than `)`.
    #[error("unbalanced parentheses: missing right parenthesis")]
    MissingRightParen,

    /// More `)` than `(`.
    #[error("unbalanced parentheses: missing left parenthesis")]
    MissingLeftParen,

    /// A `)` appears before its matching `(`.
    #[error("parentheses out of order: `)` appears before `(`")]
    ParenOrder,

    /// `()` with nothing inside.
    #[error("empty parentheses")]
    EmptyParens,

    // === Built-in Errors ===
    /// A built-in called with the wrong number of arguments.
    #[error("{name} takes {expected} argument(s), found {found}")]
    BuiltinArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    /// `Random(m, n)` with literal `m > n`.
    #[error("Random: the first argument must be smaller than the second ({min} > {max})")]
    RandomRange { min: String, max: String },

    /// The negation marker with nothing to negate.
    #[error("negation marker without an operand")]
    DanglingNegation,

    // === Name Errors ===
    /// An operand collides with a reserved word.
    #[error("`{word}` is a reserved word")]
    ReservedWord { word: String },
}

impl ExprError {
    /// Creates an unexpected token error.
    pub fn unexpected(found: impl Into<String>, expected: impl Into<String>, offset: usize) -> Self {
        ExprError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            offset,
        }
    }

    /// Creates an end-of-input error.
    pub fn eof(expected: impl Into<String>) -> Self {
        ExprError::UnexpectedEnd {
            expected: expected.into(),
        }
    }

    /// Returns true for the three parenthesis-balance errors.
    pub fn is_bracket_error(&self) -> bool {
        matches!(
            self,
            ExprError::MissingRightParen
                | ExprError::MissingLeftParen
                | ExprError::ParenOrder
                | ExprError::EmptyParens
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_message() {
        let err = ExprError::RandomRange {
            min: "5".into(),
            max: "1".into(),
        };
        assert!(err.to_string().contains("first argument must be smaller"));
    }

    #[test]
    fn test_lex_error_passthrough() {
        let err: ExprError = LexError { ch: '$', offset: 3 }.into();
        assert_eq!(err.to_string(), "unexpected character `$` at offset 3");
    }

    #[test]
    fn test_is_bracket_error() {
        assert!(ExprError::EmptyParens.is_bracket_error());
        assert!(!ExprError::Empty.is_bracket_error());
    }
}
