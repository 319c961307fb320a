//! Negation rewriting.
//!
//! The pseudocode negates a condition by writing a marker *after* it:
//! `(a > b)でない`, `flagでない`. This stage moves the negation to the front
//! as a prefix `!`, which is what the parser expects.

use crate::parser::ExprError;

/// Trailing marker meaning "is not".
pub const NEGATION_MARKER: &str = "でない";

fn is_operand_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == ':'
}

/// Byte offset where the operand that ends at `end` begins.
///
/// Handles a parenthesised group (with an optional call name in front of
/// it), an indexed array element, and a bare name or number.
fn operand_start(text: &str, end: usize) -> Option<usize> {
    let head = &text[..end];
    let mut pos = head.len();

    // Closing delimiters are matched backwards, then a name may precede them.
    loop {
        let last = head[..pos].chars().next_back()?;
        let (open, close) = match last {
            ')' => ('(', ')'),
            ']' => ('[', ']'),
            _ => break,
        };
        let mut depth = 0usize;
        let mut matched = None;
        for (i, ch) in head[..pos].char_indices().rev() {
            if ch == close {
                depth += 1;
            } else if ch == open {
                depth -= 1;
                if depth == 0 {
                    matched = Some(i);
                    break;
                }
            }
        }
        pos = matched?;
        if !head[..pos].ends_with(is_operand_char) {
            return Some(pos);
        }
    }

    let start = head[..pos]
        .char_indices()
        .rev()
        .take_while(|&(_, ch)| is_operand_char(ch))
        .last()
        .map(|(i, _)| i)?;
    Some(start)
}

/// Rewrites every trailing negation marker to a prefix `!`.
///
/// # Errors
///
/// Returns [`ExprError::DanglingNegation`] when a marker has no operand
/// before it.
///
/// # Example
///
/// ```
/// use pseudoblocks::normalizer::rewrite_negation;
///
/// assert_eq!(rewrite_negation("(a > b)でない").unwrap(), "!(a > b)");
/// assert_eq!(rewrite_negation("x && flagでない").unwrap(), "x && !flag");
/// ```
pub fn rewrite_negation(fragment: &str) -> Result<String, ExprError> {
    let mut text = fragment.to_string();

    while let Some(at) = find_marker(&text) {
        let end = text[..at].trim_end().len();
        let start = operand_start(&text, end).ok_or(ExprError::DanglingNegation)?;
        let mut rewritten = String::with_capacity(text.len());
        rewritten.push_str(&text[..start]);
        rewritten.push('!');
        rewritten.push_str(&text[start..end]);
        rewritten.push_str(&text[at + NEGATION_MARKER.len()..]);
        text = rewritten;
    }

    Ok(text)
}

/// First marker outside a string literal.
fn find_marker(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if in_string && (escaped || ch == '\\') {
            escaped = !escaped;
        } else if ch == '"' {
            in_string = !in_string;
        } else if !in_string && text[i..].starts_with(NEGATION_MARKER) {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_negation() {
        assert_eq!(rewrite_negation("(a == 1)でない").unwrap(), "!(a == 1)");
    }

    #[test]
    fn test_call_negation() {
        assert_eq!(rewrite_negation("Odd(n)でない").unwrap(), "!Odd(n)");
    }

    #[test]
    fn test_indexed_negation() {
        assert_eq!(rewrite_negation("seen[i]でない").unwrap(), "!seen[i]");
    }

    #[test]
    fn test_bare_negation_with_space() {
        assert_eq!(rewrite_negation("done でない").unwrap(), "!done");
    }

    #[test]
    fn test_multiple_markers() {
        assert_eq!(
            rewrite_negation("aでない && (b)でない").unwrap(),
            "!a && !(b)"
        );
    }

    #[test]
    fn test_marker_in_string_kept() {
        assert_eq!(rewrite_negation("\"でない\"").unwrap(), "\"でない\"");
    }

    #[test]
    fn test_dangling_marker() {
        assert_eq!(rewrite_negation("でない"), Err(ExprError::DanglingNegation));
        assert_eq!(rewrite_negation("a && でない"), Err(ExprError::DanglingNegation));
    }

    #[test]
    fn test_already_rewritten_unchanged() {
        assert_eq!(rewrite_negation("!(a > b)").unwrap(), "!(a > b)");
    }
}
