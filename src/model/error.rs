//! Errors raised by tree edits and drag projection.

use super::NodeId;
use thiserror::Error;

/// A structural edit that could not be applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    /// No node with this id exists in the tree.
    #[error("no statement with id `{id}`")]
    NotFound { id: NodeId },

    /// An inserted node reuses an id already present in the tree.
    #[error("statement id `{id}` is already in use")]
    DuplicateId { id: NodeId },

    /// A node cannot become a descendant of itself.
    #[error("cannot move `{id}` under its own subtree")]
    CycleDetected { id: NodeId },

    /// Requested depth disagrees with the requested parent.
    #[error("depth {requested} does not fit under a parent at depth {parent_depth:?}")]
    DepthMismatch {
        requested: usize,
        parent_depth: Option<usize>,
    },

    /// Sibling index past the end of the target list.
    #[error("sibling index {index} out of range (0..={len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Projection needs a strictly positive indentation unit.
    #[error("indentation unit must be positive, got {0}")]
    InvalidIndent(f64),
}

impl TreeError {
    pub fn not_found(id: &NodeId) -> Self {
        TreeError::NotFound { id: id.clone() }
    }
}
