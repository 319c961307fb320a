//! # pseudoblocks
//!
//! Block-built pseudocode programs: a statement-tree model, a structural
//! validator and code generators for JavaScript, Python, VBA and Ruby.
//!
//! ## Architecture
//!
//! A program is edited as a tree of statement nodes whose slots hold short
//! expression fragments. Rendering follows a pipeline:
//!
//! ```text
//! Program → flatten → validate → CodeGen → JavaScript | Python | VBA | Ruby
//!                        ↑
//!   fragment → normalizer → lexer → parser → Expr
//! ```
//!
//! Each phase is implemented as a separate module:
//!
//! - [`model`] - Statement tree, flattening, editing and drag projection
//! - [`operand`] - Builds node tokens from structured operand input
//! - [`normalizer`] - Folds glyphs and negation markers, checks brackets and names
//! - [`lexer`] - Tokenizes expression fragments
//! - [`parser`] - Builds expression trees from tokens
//! - [`ast`] - Expression type definitions
//! - [`semantic`] - Structural and expression validation
//! - [`codegen`] - Target-language backends
//!
//! ## Example
//!
//! ```
//! use pseudoblocks::codegen::{RenderOptions, Target, render};
//! use pseudoblocks::model::{Program, StatementKind, StatementNode};
//! use pseudoblocks::semantic::validate;
//!
//! let program = Program::new(vec![
//!     StatementNode::new("1", StatementKind::Assign, &["a", "2"]),
//!     StatementNode::new("2", StatementKind::Output, &["a"]),
//! ]);
//!
//! assert!(!validate(&program).has_error());
//! let js = render(&program, Target::JavaScript, &RenderOptions::default()).unwrap();
//! assert_eq!(js, "a = 2;\nconsole.log(a);\n");
//! ```

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod model;
pub mod normalizer;
pub mod operand;
pub mod parser;
pub mod semantic;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ast::{Builtin, Expr, ExprKind, Span};
    pub use crate::codegen::{
        CodeGenError, CodeGenerator, GeneratedOutput, RenderOptions, Target, normalize, render,
    };
    pub use crate::lexer::{Token, TokenKind, lex};
    pub use crate::model::{
        FlattenedNode, NodeId, Program, StatementKind, StatementNode, TreeError, flatten, rebuild,
    };
    pub use crate::normalizer::prepare;
    pub use crate::operand::{OperandBag, build_tokens};
    pub use crate::parser::ExprError;
    pub use crate::semantic::{ValidationError, ValidationReport, validate};
}
