//! Reserved-word detection.
//!
//! A program is rendered into several languages, so an operand name must not
//! be a keyword in *any* of them, nor a name the generated code relies on.
//! Both sets are compared case-insensitively because VBA is.

use crate::ast::{Expr, ExprKind};
use crate::parser::ExprError;

/// Keywords of every target, plus the pseudocode's own connectives.
pub const RESERVED_WORDS: &[&str] = &[
    "__encoding__", "__file__", "__line__", "alias", "and", "array", "as", "assert", "async",
    "await", "begin", "boolean", "break", "byref", "byte", "byval", "call", "case", "catch",
    "class", "const", "continue", "currency", "date", "debug", "debugger", "declare", "def",
    "default", "defined", "del", "delete", "dim", "do", "double", "each", "elif", "else",
    "elseif", "elsif", "empty", "end", "ensure", "enum", "eqv", "erase", "error", "event",
    "except", "exit", "export", "extends", "false", "finally", "for", "friend", "from",
    "function", "get", "global", "gosub", "goto", "if", "imp", "implements", "import", "in",
    "instanceof", "integer", "interface", "is", "lambda", "let", "lib", "like", "long", "loop",
    "lset", "me", "mod", "module", "new", "next", "nil", "none", "nonlocal", "not", "nothing",
    "null", "on", "option", "optional", "or", "package", "paramarray", "pass", "preserve",
    "print", "private", "property", "protected", "public", "puts", "raise", "raiseevent",
    "redim", "redo", "rem", "rescue", "resume", "retry", "return", "rset", "select", "self",
    "set", "single", "static", "step", "stop", "string", "sub", "super", "switch", "then",
    "this", "throw", "to", "true", "try", "type", "typeof", "undef", "undefined", "unless",
    "until", "var", "variant", "void", "wend", "when", "while", "with", "withevents", "xor",
    "yield",
];

/// Names the generated code itself refers to (loop helpers, imported
/// modules, runtime functions). A user variable with one of these names
/// would shadow it.
pub const GENERATED_NAMES: &[&str] = &[
    "console", "fill_index", "format", "int", "lbound", "len", "math", "rand", "random",
    "range", "rnd", "ubound", "worksheetfunction",
];

/// Returns true if `word` is reserved in any target.
pub fn is_reserved(word: &str) -> bool {
    let lower = word.trim().to_lowercase();
    RESERVED_WORDS.binary_search(&lower.as_str()).is_ok()
        || GENERATED_NAMES.binary_search(&lower.as_str()).is_ok()
}

/// Rejects a raw operand value that collides with a reserved word.
///
/// `true`/`false` are accepted when the slot is declared boolean.
pub fn check_reserved(value: &str, boolean_slot: bool) -> Result<(), ExprError> {
    let trimmed = value.trim();
    if boolean_slot && (trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false"))
    {
        return Ok(());
    }
    if is_reserved(trimmed) {
        return Err(ExprError::ReservedWord {
            word: trimmed.to_string(),
        });
    }
    Ok(())
}

/// Rejects any name inside a parsed expression that is a reserved word.
///
/// Boolean literals are parsed as literals, never as names, so they pass.
pub fn check_expr_names(expr: &Expr) -> Result<(), ExprError> {
    let mut found = None;
    expr.walk(&mut |e| {
        if found.is_some() {
            return;
        }
        let name = match &e.kind {
            ExprKind::Identifier(name) => name,
            ExprKind::Call { name, .. } => name,
            _ => return,
        };
        // Dotted names are checked segment by segment.
        if let Some(word) = name.split('.').find(|segment| is_reserved(segment)) {
            found = Some(word.to_string());
        }
    });
    match found {
        Some(word) => Err(ExprError::ReservedWord { word }),
        None => Ok(()),
    }
}
