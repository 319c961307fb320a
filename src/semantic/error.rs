//! Validation error types.
//!
//! Structural problems (bad sibling pairing, children under a terminal line,
//! constant reassignment, undefined functions) and expression problems found
//! inside a node's tokens. Either kind blocks code generation. Each error
//! carries the 1-based line of the offending node.

use std::fmt;

use thiserror::Error;

use crate::model::{NodeId, StatementKind};
use crate::parser::ExprError;

/// What is wrong with one line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationErrorKind {
    // === Tree Errors ===
    /// Two nodes share an id.
    #[error("statement id `{id}` is already used on line {original_line}")]
    DuplicateId { id: NodeId, original_line: usize },

    // === Pairing Errors ===
    /// A block line not followed by the sibling that continues or closes it.
    #[error("`{kind}` must be followed by {expected}")]
    MissingSuccessor {
        kind: StatementKind,
        expected: &'static str,
    },

    /// A continuation or closing line without the sibling that opens it.
    #[error("`{kind}` must come after {expected}")]
    MissingPredecessor {
        kind: StatementKind,
        expected: &'static str,
    },

    /// Children under a kind that does not open a scope.
    #[error("this line cannot have a process attached under it")]
    ChildrenNotAllowed { kind: StatementKind },

    /// `Break` with no enclosing loop.
    #[error("`Break` must be inside a loop")]
    BreakOutsideLoop,

    // === Function Errors ===
    /// A call to a function no `DefineFunction` declares.
    #[error("function `{name}` is not defined")]
    UndefinedFunction { name: String },

    /// A call with a different argument count than the definition.
    #[error("function `{name}` called with {found} argument(s), expected {expected}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A second definition of the same function name.
    #[error("function `{name}` already defined on line {original_line}")]
    DuplicateFunction { name: String, original_line: usize },

    /// A definition nested inside another statement.
    #[error("function `{name}` must be defined at the top level")]
    NestedFunction { name: String },

    // === Constant Errors ===
    /// A write to a name previously declared constant.
    #[error("cannot reassign a constant `{name}`")]
    ConstantReassigned { name: String },

    // === Token Errors ===
    /// The node carries the wrong number of token slots for its kind.
    #[error("`{kind}` expects {expected} operand(s), found {found}")]
    TokenCount {
        kind: StatementKind,
        expected: usize,
        found: usize,
    },

    /// A write target that is not a variable or array element.
    #[error("`{text}` cannot be assigned to")]
    NotAssignable { text: String },

    /// A problem inside one expression slot.
    #[error(transparent)]
    Expression(#[from] ExprError),
}

/// A validation error located at a line of the flattened program.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// 1-based position in the flattened (pre-order) program.
    pub line: usize,
    /// Node the error belongs to.
    pub id: NodeId,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(line: usize, id: NodeId, kind: ValidationErrorKind) -> Self {
        Self { line, id, kind }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ValidationErrorKind::Expression(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = ValidationError::new(
            3,
            NodeId::new("n3"),
            ValidationErrorKind::MissingSuccessor {
                kind: StatementKind::While,
                expected: "EndWhile",
            },
        );
        assert_eq!(err.to_string(), "line 3: `While` must be followed by EndWhile");
    }

    #[test]
    fn test_expression_passthrough() {
        let kind: ValidationErrorKind = ExprError::EmptyParens.into();
        assert_eq!(kind.to_string(), "empty parentheses");
    }
}
