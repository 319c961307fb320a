//! Program validation for pseudoblocks.
//!
//! Validation runs over the flattened tree and decides whether a program may
//! be rendered. It handles:
//!
//! - **Pairing**: every block line is continued or closed by the right
//!   sibling (`If` → `ElseIf`/`Else`/`EndIf`, `While` → `EndWhile`, ...)
//! - **Scoping**: only block lines may have children; `Break` needs a loop
//! - **Functions**: calls name a top-level definition with matching arity
//! - **Constants**: a constant is declared once and never written again
//! - **Expressions**: every expression slot normalizes and parses
//!
//! # Error Recovery
//!
//! The validator never stops at the first problem. Every node is checked and
//! all errors are returned together, each with the node's 1-based line in
//! the flattened program, so an editor can mark every bad line in one pass.
//!
//! # Usage
//!
//! ```
//! use pseudoblocks::model::{Program, StatementKind, StatementNode};
//! use pseudoblocks::semantic::validate;
//!
//! let program = Program::new(vec![
//!     StatementNode::new("1", StatementKind::While, &["x > 0"]),
//! ]);
//! let report = validate(&program);
//! assert!(report.has_error());
//! assert_eq!(report.line_numbers(), vec![1]);
//! ```

mod constants;
mod error;
mod expressions;
mod functions;
mod structure;

pub use error::{ValidationError, ValidationErrorKind};
pub use functions::{UserDefinedFunctionInfo, collect_functions};

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::model::{FlattenedNode, NodeId, Program, flatten};

/// Accumulated result of validating a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Human-readable messages, one per error.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.kind.to_string()).collect()
    }

    /// 1-based line of each error, parallel to [`messages`](Self::messages).
    pub fn line_numbers(&self) -> Vec<usize> {
        self.errors.iter().map(|e| e.line).collect()
    }

    /// The `{ hasError, errors, lineNumbers }` shape editors consume.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            has_error: self.has_error(),
            errors: self.messages(),
            line_numbers: self.line_numbers(),
        }
    }
}

/// Serializable form of a [`ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub has_error: bool,
    pub errors: Vec<String>,
    pub line_numbers: Vec<usize>,
}

/// Validates a program, collecting every structural and expression error.
pub fn validate(program: &Program) -> ValidationReport {
    let items = flatten(program);
    let mut validator = Validator::new(&items);
    validator.run();
    debug!(
        "validated {} line(s), {} error(s)",
        items.len(),
        validator.errors.len()
    );
    ValidationReport {
        errors: validator.errors,
    }
}

/// Walks the flattened program once per rule family.
///
/// Rules live in the submodules as `impl Validator` blocks.
pub(crate) struct Validator<'a> {
    items: &'a [FlattenedNode],
    /// Flattened index of every node id.
    positions: HashMap<&'a NodeId, usize>,
    /// For each item, the flattened indices of its previous and next sibling.
    siblings: Vec<(Option<usize>, Option<usize>)>,
    functions: Vec<UserDefinedFunctionInfo>,
    errors: Vec<ValidationError>,
}

impl<'a> Validator<'a> {
    fn new(items: &'a [FlattenedNode]) -> Self {
        // First occurrence wins, so a parent always sits before its children.
        let mut positions = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            positions.entry(&item.id).or_insert(i);
        }

        let mut siblings = vec![(None, None); items.len()];
        let mut last_child: HashMap<Option<&NodeId>, usize> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            if let Some(prev) = last_child.insert(item.parent_id.as_ref(), i) {
                siblings[i].0 = Some(prev);
                siblings[prev].1 = Some(i);
            }
        }

        Self {
            items,
            positions,
            siblings,
            functions: collect_functions(items),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        for index in 0..self.items.len() {
            self.check_id(index);
            self.check_structure(index);
            self.check_constants(index);
            self.check_expressions(index);
        }
    }

    fn check_id(&mut self, index: usize) {
        let id = &self.items[index].id;
        if let Some(&first) = self.positions.get(id)
            && first != index
        {
            self.report(
                index,
                ValidationErrorKind::DuplicateId {
                    id: id.clone(),
                    original_line: first + 1,
                },
            );
        }
    }

    fn report(&mut self, index: usize, kind: ValidationErrorKind) {
        let id = self.items[index].id.clone();
        self.errors.push(ValidationError::new(index + 1, id, kind));
    }

    fn previous_sibling(&self, index: usize) -> Option<&'a FlattenedNode> {
        self.siblings[index].0.map(|i| &self.items[i])
    }

    fn next_sibling(&self, index: usize) -> Option<&'a FlattenedNode> {
        self.siblings[index].1.map(|i| &self.items[i])
    }

    fn has_children(&self, index: usize) -> bool {
        self.items
            .get(index + 1)
            .is_some_and(|next| next.parent_id.as_ref() == Some(&self.items[index].id))
    }

    /// Ancestors of an item, nearest first.
    fn ancestors(&self, index: usize) -> impl Iterator<Item = &'a FlattenedNode> + '_ {
        std::iter::successors(self.parent(index), |item| {
            item.parent_id
                .as_ref()
                .and_then(|id| self.positions.get(id))
                .map(|&i| &self.items[i])
        })
        .take(self.items.len())
    }

    fn parent(&self, index: usize) -> Option<&'a FlattenedNode> {
        let id = self.items[index].parent_id.as_ref()?;
        self.positions.get(id).map(|&i| &self.items[i])
    }
}
