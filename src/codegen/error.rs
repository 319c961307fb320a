//! Code generation error types.
//!
//! Rendering refuses programs that fail validation, so most problems surface
//! as [`CodeGenErrorKind::InvalidProgram`] carrying the full report. The rest
//! come from the VBA identifier boundary or indicate a bug.

use std::fmt;

use crate::model::NodeId;
use crate::parser::ExprError;
use crate::semantic::ValidationError;

use super::transliterate::TransliterationError;

/// An error that occurred during code generation.
#[derive(Debug, Clone)]
pub struct CodeGenError {
    /// The kind of error.
    pub kind: CodeGenErrorKind,
    /// Node being rendered when the error occurred.
    pub node: Option<NodeId>,
    /// Additional context about the error.
    pub context: Option<String>,
}

impl CodeGenError {
    /// Creates a new code generation error.
    pub fn new(kind: CodeGenErrorKind) -> Self {
        Self {
            kind,
            node: None,
            context: None,
        }
    }

    /// Attaches the node being rendered.
    pub fn with_node(mut self, node: &NodeId) -> Self {
        self.node = Some(node.clone());
        self
    }

    /// Adds context information to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn invalid_program(errors: Vec<ValidationError>) -> Self {
        Self::new(CodeGenErrorKind::InvalidProgram(errors))
    }

    /// Creates an internal error (generator bug).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CodeGenErrorKind::Internal(message.into()))
    }

    /// Validation errors, when rendering was refused for an invalid program.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match &self.kind {
            CodeGenErrorKind::InvalidProgram(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code generation error: {}", self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(node) = &self.node {
            write!(f, " at node {}", node)?;
        }
        Ok(())
    }
}

impl std::error::Error for CodeGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            CodeGenErrorKind::Expression(err) => Some(err),
            CodeGenErrorKind::Transliteration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransliterationError> for CodeGenError {
    fn from(err: TransliterationError) -> Self {
        Self::new(CodeGenErrorKind::Transliteration(err))
    }
}

/// The specific kind of code generation error.
#[derive(Debug, Clone)]
pub enum CodeGenErrorKind {
    /// The program failed validation.
    InvalidProgram(Vec<ValidationError>),

    /// An expression slot failed to parse while rendering.
    Expression(ExprError),

    /// The target needs ASCII identifiers and no mapping was supplied.
    Untransliterated(Vec<String>),

    /// The transliteration service failed or returned an unusable name.
    Transliteration(TransliterationError),

    /// Internal generator error (indicates a bug).
    Internal(String),
}

impl fmt::Display for CodeGenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeGenErrorKind::InvalidProgram(errors) => {
                write!(f, "program has {} validation error(s)", errors.len())
            }
            CodeGenErrorKind::Expression(err) => write!(f, "{}", err),
            CodeGenErrorKind::Untransliterated(names) => {
                write!(f, "identifiers need transliteration: {}", names.join(", "))
            }
            CodeGenErrorKind::Transliteration(err) => write!(f, "{}", err),
            CodeGenErrorKind::Internal(msg) => {
                write!(f, "internal error: {}", msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::ValidationErrorKind;

    #[test]
    fn test_error_display() {
        let err = CodeGenError::new(CodeGenErrorKind::Untransliterated(vec!["合計".into()]));
        assert!(err.to_string().contains("need transliteration"));
        assert!(err.to_string().contains("合計"));
    }

    #[test]
    fn test_error_with_node() {
        let err = CodeGenError::internal("unpaired closer").with_node(&NodeId::new("n7"));
        assert!(err.to_string().contains("at node n7"));
    }

    #[test]
    fn test_error_with_context() {
        let err = CodeGenError::internal("missing case").with_context("in emit_block");
        assert!(err.to_string().contains("in emit_block"));
    }

    #[test]
    fn test_validation_errors_exposed() {
        let errors = vec![ValidationError::new(
            1,
            NodeId::new("1"),
            ValidationErrorKind::BreakOutsideLoop,
        )];
        let err = CodeGenError::invalid_program(errors.clone());
        assert_eq!(err.validation_errors(), errors.as_slice());
        assert!(err.to_string().contains("1 validation error(s)"));
    }
}
