//! Parser for expression fragments.
//!
//! The parser turns the tokens of one fragment into an [`Expr`]. It uses
//! Pratt parsing (precedence climbing) for operators and recognises the
//! pseudocode built-ins (`Square`, `Exponentiation`, `Random`, `Odd`,
//! `Binary`) and the `UserDefined:` call marker.
//!
//! # Example
//!
//! ```
//! use pseudoblocks::parser::parse_expression;
//! use pseudoblocks::ast::ExprKind;
//!
//! let expr = parse_expression("Square(x) + 1").unwrap();
//! assert!(matches!(expr.kind, ExprKind::Binary { .. }));
//! ```
//!
//! Fragments given to the parser are expected to have gone through glyph
//! substitution and negation rewriting already; use
//! [`crate::normalizer::prepare`] for raw operand text.

mod error;
mod expressions;
mod tokens;

pub use error::ExprError;
pub use expressions::binary_precedence;

use crate::ast::Expr;
use crate::lexer::{Token, TokenKind, lex};

/// Parser over the tokens of one fragment.
pub struct Parser<'a> {
    /// The tokens to parse.
    tokens: &'a [Token],
    /// Current position in the token stream.
    current: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given tokens.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses exactly one expression covering every token.
    pub fn parse(&mut self) -> Result<Expr, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let expr = self.parse_expression()?;
        self.finish()?;
        Ok(expr)
    }

    /// Parses a comma-separated list of expressions; empty input is an
    /// empty list.
    pub fn parse_list(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        if self.tokens.is_empty() {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.finish()?;
        Ok(items)
    }

    fn finish(&self) -> Result<(), ExprError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ExprError::unexpected(
                &token.text,
                "end of expression",
                token.span.start,
            )),
        }
    }
}

/// Operator precedence levels for Pratt parsing.
///
/// Higher values mean higher precedence (bind tighter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 0,
    Or = 1,             // ||
    And = 2,            // &&
    Comparison = 3,     // == != < > <= >=
    Additive = 4,       // + -
    Multiplicative = 5, // * / // %
    Unary = 6,          // - !
    Power = 7,          // **
    Primary = 8,        // literals, names, calls, groups
}

impl Precedence {
    pub(crate) fn from_u8(val: u8) -> Self {
        match val {
            0 => Precedence::Lowest,
            1 => Precedence::Or,
            2 => Precedence::And,
            3 => Precedence::Comparison,
            4 => Precedence::Additive,
            5 => Precedence::Multiplicative,
            6 => Precedence::Unary,
            7 => Precedence::Power,
            _ => Precedence::Primary,
        }
    }
}

/// Lexes and parses one already-normalized fragment.
pub fn parse_expression(fragment: &str) -> Result<Expr, ExprError> {
    let tokens = lex(fragment)?;
    Parser::new(&tokens).parse()
}

/// Lexes and parses a comma-separated list (array literals, arguments).
pub fn parse_list(fragment: &str) -> Result<Vec<Expr>, ExprError> {
    let tokens = lex(fragment)?;
    Parser::new(&tokens).parse_list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Builtin, ExprKind, UnaryOp};

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        let expr = parse_expression("1 + 2 * 3").unwrap();
        match expr.kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary {
                        op: BinaryOp::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_logical_below_comparison() {
        let expr = parse_expression("a < 1 && b >= 2").unwrap();
        assert!(matches!(
            expr.kind,
            ExprKind::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_power_right_associative() {
        let expr = parse_expression("2 ** 3 ** 2").unwrap();
        match expr.kind {
            ExprKind::Binary { left, right, .. } => {
                assert!(matches!(left.kind, ExprKind::Number(_)));
                assert!(matches!(right.kind, ExprKind::Binary { .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_builtin() {
        let expr = parse_expression("Random(1, 6)").unwrap();
        assert!(matches!(
            expr.kind,
            ExprKind::Builtin {
                func: Builtin::Random,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_builtin_arity() {
        assert_eq!(
            parse_expression("Square(1, 2)").unwrap_err(),
            ExprError::BuiltinArity {
                name: "Square",
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_parse_random_range() {
        assert!(matches!(
            parse_expression("Random(5, 1)"),
            Err(ExprError::RandomRange { .. })
        ));
        assert!(parse_expression("Random(1, 5)").is_ok());
        assert!(parse_expression("Random(n, 1)").is_ok());
        assert!(matches!(
            parse_expression("Random(-1, -3)"),
            Err(ExprError::RandomRange { .. })
        ));
    }

    #[test]
    fn test_parse_user_defined_call() {
        let expr = parse_expression("UserDefined:twice(a, 2)").unwrap();
        match expr.kind {
            ExprKind::Call {
                name,
                args,
                user_defined,
            } => {
                assert_eq!(name, "twice");
                assert_eq!(args.len(), 2);
                assert!(user_defined);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_index_and_negation() {
        let expr = parse_expression("!(a[i + 1] > 0)").unwrap();
        match expr.kind {
            ExprKind::Unary { op, operand } => {
                assert_eq!(op, UnaryOp::Not);
                assert!(matches!(operand.kind, ExprKind::Grouped(_)));
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_string_contents() {
        let expr = parse_expression(r#""hello""#).unwrap();
        assert_eq!(expr.kind, ExprKind::StringLiteral("hello".to_string()));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_expression("").unwrap_err(), ExprError::Empty);
        assert!(matches!(
            parse_expression("1 +"),
            Err(ExprError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse_expression("a b"),
            Err(ExprError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_expression(r#""open"#),
            Err(ExprError::UnterminatedString { offset: 0 })
        ));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("1, 2, 3").unwrap().len(), 3);
        assert!(parse_list("").unwrap().is_empty());
        assert!(parse_list("1,").is_err());
    }
}
