//! Bracket balance analysis.
//!
//! Runs over the concatenated operand tokens of one statement and reports
//! three independent problems: unpaired parentheses, a `)` that closes before
//! any `(` is open, and an empty `()` pair. Each problem is reported at most
//! once, and the presence of one does not hide the others.

use crate::parser::ExprError;

/// Checks parenthesis balance across the operand fragments of a statement.
///
/// Returns every problem found, in a fixed order: count mismatch, order
/// violation, empty pair. An empty result means the brackets are fine.
///
/// A `()` directly after a name is an argument-less call, not an empty pair.
///
/// # Example
///
/// ```
/// use pseudoblocks::normalizer::check_brackets;
/// use pseudoblocks::parser::ExprError;
///
/// assert!(check_brackets(&["(", "a", ")"]).is_empty());
/// assert_eq!(check_brackets(&["(", ")"]), vec![ExprError::EmptyParens]);
/// ```
pub fn check_brackets<S: AsRef<str>>(fragments: &[S]) -> Vec<ExprError> {
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut out_of_order = false;
    let mut empty_pair = false;

    // Last significant character seen, across fragment boundaries.
    let mut previous: Option<char> = None;
    // Character before the most recent `(`, when that `(` is still the
    // last significant character.
    let mut before_open: Option<Option<char>> = None;

    for fragment in fragments {
        let mut in_string = false;
        let mut escaped = false;
        for ch in fragment.as_ref().chars() {
            if in_string && (escaped || ch == '\\') {
                escaped = !escaped;
                continue;
            }
            if ch == '"' {
                in_string = !in_string;
                previous = Some(ch);
                before_open = None;
                continue;
            }
            if in_string || ch.is_whitespace() {
                continue;
            }

            match ch {
                '(' => {
                    opened += 1;
                    before_open = Some(previous);
                }
                ')' => {
                    closed += 1;
                    if closed > opened {
                        out_of_order = true;
                    }
                    if let Some(before) = before_open
                        && !before.is_some_and(is_name_char)
                    {
                        empty_pair = true;
                    }
                    before_open = None;
                }
                _ => before_open = None,
            }
            previous = Some(ch);
        }
    }

    let mut errors = Vec::new();
    if opened > closed {
        errors.push(ExprError::MissingRightParen);
    } else if closed > opened {
        errors.push(ExprError::MissingLeftParen);
    }
    if out_of_order {
        errors.push(ExprError::ParenOrder);
    }
    if empty_pair {
        errors.push(ExprError::EmptyParens);
    }
    errors
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
