//! Token normalizer for operand fragments.
//!
//! Each token slot of a statement holds user-typed expression text. Before
//! that text can be validated or rendered it goes through a fixed pipeline:
//!
//! ```text
//! raw fragment
//!   → substitute_glyphs   (full-width forms, ×, ÷, ≠, かつ, ...)
//!   → rewrite_negation    (`xでない` → `!x`)
//!   → check_brackets      (balance, order, empty pairs)
//!   → parse               (built-ins recognised, arity and Random order)
//!   → check_expr_names    (reserved words)
//!   → Expr
//! ```
//!
//! Every stage is pure and leaves already-normalized input unchanged.
//! Printing the resulting [`Expr`] in a target's syntax (where the built-ins
//! get rewritten) lives in [`crate::codegen::normalize`].

mod brackets;
mod glyphs;
mod negation;
mod reserved;

pub use brackets::check_brackets;
pub use glyphs::substitute_glyphs;
pub use negation::{NEGATION_MARKER, rewrite_negation};
pub use reserved::{GENERATED_NAMES, RESERVED_WORDS, check_expr_names, check_reserved, is_reserved};

use log::trace;

use crate::ast::Expr;
use crate::parser::{self, ExprError};

/// Runs the textual stages (glyphs, then negation) on one fragment.
pub fn normalize_text(fragment: &str) -> Result<String, ExprError> {
    rewrite_negation(&substitute_glyphs(fragment))
}

/// Normalizes one fragment and parses it into an expression.
///
/// # Example
///
/// ```
/// use pseudoblocks::normalizer::prepare;
///
/// let expr = prepare("（ｘ ＋ 1）× 2").unwrap();
/// assert!(!expr.is_atomic());
/// ```
pub fn prepare(fragment: &str) -> Result<Expr, ExprError> {
    let text = checked_text(fragment)?;
    let expr = parser::parse_expression(&text)?;
    check_expr_names(&expr)?;
    Ok(expr)
}

/// Normalizes a comma-separated fragment (array literal, argument list).
pub fn prepare_list(fragment: &str) -> Result<Vec<Expr>, ExprError> {
    let text = checked_text(fragment)?;
    let items = parser::parse_list(&text)?;
    for item in &items {
        check_expr_names(item)?;
    }
    Ok(items)
}

fn checked_text(fragment: &str) -> Result<String, ExprError> {
    let text = normalize_text(fragment)?;
    if let Some(err) = check_brackets(&[text.as_str()]).into_iter().next() {
        return Err(err);
    }
    trace!("normalized `{fragment}` to `{text}`");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ExprKind, UnaryOp};

    #[test]
    fn test_prepare_full_pipeline() {
        let expr = prepare("(ａ ≧ 1)でない かつ b").unwrap();
        match expr.kind {
            ExprKind::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOp::And);
                assert!(matches!(
                    left.kind,
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        ..
                    }
                ));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_bracket_errors_win_over_parse_errors() {
        assert_eq!(prepare("(a + 1"), Err(ExprError::MissingRightParen));
        assert_eq!(prepare("a + ()"), Err(ExprError::EmptyParens));
    }

    #[test]
    fn test_reserved_name_rejected() {
        assert!(matches!(
            prepare("while + 1"),
            Err(ExprError::ReservedWord { .. })
        ));
    }

    #[test]
    fn test_random_order_rejected() {
        let err = prepare("Random(5, 1)").unwrap_err();
        assert!(err.to_string().contains("first argument must be smaller"));
    }

    #[test]
    fn test_prepare_list() {
        assert_eq!(prepare_list("1、2、3").unwrap().len(), 3);
        assert!(prepare_list("").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_text_idempotent() {
        let once = normalize_text("xでないまたはy≠2").unwrap();
        assert_eq!(once, "!x || y!=2");
        assert_eq!(normalize_text(&once).unwrap(), once);
    }
}
