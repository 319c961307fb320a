//! Slot grammars.
//!
//! The regular languages operand slots must belong to. Each check reuses
//! the fragment lexer so the grammar accepted here is exactly the grammar
//! the parser understands later.

use crate::lexer::{TokenKind, is_single};
use crate::normalizer::{is_reserved, substitute_glyphs};

/// A plain variable name: one identifier token, no dots, not reserved.
pub fn is_variable_name(text: &str) -> bool {
    let text = text.trim();
    is_single(text, TokenKind::Identifier) && !text.contains('.') && !is_reserved(text)
}

/// A signed decimal: `3`, `-2`, `0.5`.
pub fn is_number(text: &str) -> bool {
    let text = text.trim();
    let digits = text.strip_prefix('-').unwrap_or(text);
    is_single(digits, TokenKind::Number) && !digits.starts_with(char::is_whitespace)
}

/// An array index: a variable name, a number, or a comma-separated list of
/// those (the list form is what bulk assignment uses).
pub fn is_index(text: &str) -> bool {
    let text = substitute_glyphs(text);
    let single = |item: &str| is_variable_name(item) || is_number(item);
    if single(&text) {
        return true;
    }
    text.contains(',') && text.split(',').all(single)
}

/// A constant name: a variable name starting with an uppercase letter.
pub fn is_constant_name(text: &str) -> bool {
    let text = text.trim();
    is_variable_name(text) && text.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_names() {
        assert!(is_variable_name("total"));
        assert!(is_variable_name("合計"));
        assert!(is_variable_name("_tmp1"));
        assert!(!is_variable_name("1st"));
        assert!(!is_variable_name("a b"));
        assert!(!is_variable_name("Math.floor"));
        assert!(!is_variable_name("while"));
        assert!(!is_variable_name(""));
    }

    #[test]
    fn test_numbers() {
        assert!(is_number("42"));
        assert!(is_number("-3.5"));
        assert!(!is_number("- 3"));
        assert!(!is_number("3."));
        assert!(!is_number("x"));
        assert!(!is_number("--1"));
    }

    #[test]
    fn test_indices() {
        assert!(is_index("i"));
        assert!(is_index("0"));
        assert!(is_index("1, 2, 3"));
        assert!(is_index("1、j"));
        assert!(!is_index("i + 1,"));
        assert!(!is_index(""));
    }

    #[test]
    fn test_constant_names() {
        assert!(is_constant_name("MAX"));
        assert!(is_constant_name("Limit"));
        assert!(!is_constant_name("max"));
        assert!(!is_constant_name("合計"));
    }
}
