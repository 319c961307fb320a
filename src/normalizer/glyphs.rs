//! Glyph substitution.
//!
//! Operands are often typed on a Japanese IME, so operators arrive as
//! full-width forms or as mathematical glyphs. This stage folds all of them
//! to the ASCII operators the lexer understands. String literal contents are
//! left untouched.

/// Words that act as logical connectives, with their symbolic form.
const CONNECTIVES: [(&str, &str); 2] = [("かつ", " && "), ("または", " || ")];

/// Offset between a full-width form (U+FF01..=U+FF5E) and its ASCII twin.
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

/// Maps one glyph to its ASCII replacement, if it has one.
fn glyph(ch: char) -> Option<&'static str> {
    let replacement = match ch {
        '×' => "*",
        '÷' => "//",
        '−' => "-",
        '≠' => "!=",
        '≧' | '≥' => ">=",
        '≦' | '≤' => "<=",
        '、' => ",",
        '「' | '」' => "\"",
        '\u{3000}' => " ",
        _ => return None,
    };
    Some(replacement)
}

fn fold_full_width(ch: char) -> char {
    if ('\u{FF01}'..='\u{FF5E}').contains(&ch) {
        char::from_u32(ch as u32 - FULL_WIDTH_OFFSET).unwrap_or(ch)
    } else {
        ch
    }
}

/// Rewrites glyph operators and connective words to their ASCII form.
///
/// Applying this twice gives the same result as applying it once.
///
/// # Example
///
/// ```
/// use pseudoblocks::normalizer::substitute_glyphs;
///
/// assert_eq!(substitute_glyphs("ａ×２"), "a*2");
/// assert_eq!(substitute_glyphs("x≧1かつy≠0"), "x>=1 && y!=0");
/// ```
pub fn substitute_glyphs(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = fragment;

    while let Some(ch) = rest.chars().next() {
        if in_string && (escaped || ch == '\\') {
            escaped = !escaped;
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        if !in_string
            && let Some((word, symbol)) = CONNECTIVES.iter().find(|(w, _)| rest.starts_with(w))
        {
            out.push_str(symbol);
            rest = &rest[word.len()..];
            continue;
        }

        let folded = fold_full_width(ch);
        match glyph(folded) {
            Some("\"") => {
                in_string = !in_string;
                out.push('"');
            }
            // Glyphs inside a string literal are text, not operators.
            Some(_) if in_string => out.push(folded),
            Some(replacement) => out.push_str(replacement),
            None => {
                if folded == '"' {
                    in_string = !in_string;
                }
                if in_string {
                    out.push(ch);
                } else {
                    out.push(folded);
                }
            }
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}
