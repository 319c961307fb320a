//! Statement tree model for pseudoblocks programs.
//!
//! A program is a forest of [`StatementNode`]s. Each node owns its children
//! exclusively; there are no back pointers inside the tree. Editors work on
//! the *flattened* projection ([`FlattenedNode`]), where each entry knows its
//! parent id, depth and sibling index, and turn edits back into a tree with
//! [`rebuild`].
//!
//! # Structure
//!
//! ```text
//! Program
//! └── Vec<StatementNode>
//!     ├── Assign      { tokens: [lhs, rhs] }
//!     ├── While       { tokens: [cond], children: [...] }
//!     ├── EndWhile
//!     └── ...
//! ```
//!
//! Block statements are *siblings*: an `If` owns its then-branch as children,
//! and is followed among its siblings by `ElseIf`/`Else`/`EndIf` nodes that
//! own their own branches. The structural validator enforces that pairing.
//!
//! # Persistence
//!
//! The tree serializes to JSON in exactly the [`StatementNode`] shape. Derived
//! fields (depth, parent, index) only exist on [`FlattenedNode`] and are never
//! persisted.

mod edit;
mod error;
mod flatten;
pub mod projection;

pub use edit::NodeProperty;
pub use error::TreeError;
pub use flatten::{FlattenedNode, Rebuilt, flatten, rebuild, remove_children_of};
pub use projection::{Projection, project};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Opaque unique identifier of a statement node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The closed set of statements a program line can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatementKind {
    Assign,
    InitializeArray,
    BulkAssignToArray,
    Increment,
    Decrement,
    Output,
    If,
    ElseIf,
    Else,
    EndIf,
    While,
    EndWhile,
    DoWhile,
    EndDoWhile,
    ForIncrement,
    ForDecrement,
    EndFor,
    DefineFunction,
    Defined,
    CallUserFunction,
    Break,
    Sub,
    EndSub,
}

impl StatementKind {
    /// Every kind, in declaration order.
    pub const ALL: [StatementKind; 23] = [
        StatementKind::Assign,
        StatementKind::InitializeArray,
        StatementKind::BulkAssignToArray,
        StatementKind::Increment,
        StatementKind::Decrement,
        StatementKind::Output,
        StatementKind::If,
        StatementKind::ElseIf,
        StatementKind::Else,
        StatementKind::EndIf,
        StatementKind::While,
        StatementKind::EndWhile,
        StatementKind::DoWhile,
        StatementKind::EndDoWhile,
        StatementKind::ForIncrement,
        StatementKind::ForDecrement,
        StatementKind::EndFor,
        StatementKind::DefineFunction,
        StatementKind::Defined,
        StatementKind::CallUserFunction,
        StatementKind::Break,
        StatementKind::Sub,
        StatementKind::EndSub,
    ];

    /// Returns true if statements of this kind may own nested children.
    pub fn is_scoping(self) -> bool {
        matches!(
            self,
            StatementKind::If
                | StatementKind::ElseIf
                | StatementKind::Else
                | StatementKind::While
                | StatementKind::DoWhile
                | StatementKind::ForIncrement
                | StatementKind::ForDecrement
                | StatementKind::DefineFunction
                | StatementKind::Sub
        )
    }

    /// Returns true for loop headers (the scopes `Break` may leave).
    pub fn is_loop(self) -> bool {
        matches!(
            self,
            StatementKind::While
                | StatementKind::DoWhile
                | StatementKind::ForIncrement
                | StatementKind::ForDecrement
        )
    }

    /// Returns true for kinds that write to a variable named by `tokens[0]`.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            StatementKind::Assign
                | StatementKind::InitializeArray
                | StatementKind::BulkAssignToArray
                | StatementKind::Increment
                | StatementKind::Decrement
        )
    }

    /// Returns true for the kinds that open a block closed by a later sibling.
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            StatementKind::If
                | StatementKind::While
                | StatementKind::DoWhile
                | StatementKind::ForIncrement
                | StatementKind::ForDecrement
                | StatementKind::DefineFunction
                | StatementKind::Sub
        )
    }

    /// Returns true for the kinds that close a block opened by an earlier sibling.
    pub fn closes_block(self) -> bool {
        matches!(
            self,
            StatementKind::EndIf
                | StatementKind::EndWhile
                | StatementKind::EndDoWhile
                | StatementKind::EndFor
                | StatementKind::Defined
                | StatementKind::EndSub
        )
    }

    /// Number of token slots this kind expects, if fixed.
    ///
    /// `Output` takes one or more items and returns `None`.
    pub fn token_arity(self) -> Option<usize> {
        match self {
            StatementKind::Output => None,
            StatementKind::Assign
            | StatementKind::InitializeArray
            | StatementKind::BulkAssignToArray
            | StatementKind::Increment
            | StatementKind::Decrement
            | StatementKind::DefineFunction
            | StatementKind::CallUserFunction => Some(2),
            StatementKind::If
            | StatementKind::ElseIf
            | StatementKind::While
            | StatementKind::DoWhile
            | StatementKind::Sub => Some(1),
            StatementKind::ForIncrement | StatementKind::ForDecrement => Some(4),
            StatementKind::Else
            | StatementKind::EndIf
            | StatementKind::EndWhile
            | StatementKind::EndDoWhile
            | StatementKind::EndFor
            | StatementKind::Defined
            | StatementKind::Break
            | StatementKind::EndSub => Some(0),
        }
    }
}

impl StatementKind {
    /// Token slots holding expression text, given the node's token count.
    pub fn expression_slots(self, token_count: usize) -> Vec<usize> {
        let slots: &[usize] = match self {
            StatementKind::Output => return (0..token_count).collect(),
            StatementKind::Assign
            | StatementKind::InitializeArray
            | StatementKind::BulkAssignToArray
            | StatementKind::Increment
            | StatementKind::Decrement
            | StatementKind::DefineFunction
            | StatementKind::CallUserFunction => &[0, 1],
            StatementKind::If
            | StatementKind::ElseIf
            | StatementKind::While
            | StatementKind::DoWhile => &[0],
            StatementKind::ForIncrement | StatementKind::ForDecrement => &[0, 1, 2, 3],
            _ => &[],
        };
        slots.iter().copied().filter(|&i| i < token_count).collect()
    }

    /// Whether token `slot` holds a comma-separated list rather than one
    /// expression.
    pub fn is_list_slot(self, slot: usize) -> bool {
        slot == 1
            && matches!(
                self,
                StatementKind::InitializeArray
                    | StatementKind::DefineFunction
                    | StatementKind::CallUserFunction
            )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Assign => "Assign",
            StatementKind::InitializeArray => "InitializeArray",
            StatementKind::BulkAssignToArray => "BulkAssignToArray",
            StatementKind::Increment => "Increment",
            StatementKind::Decrement => "Decrement",
            StatementKind::Output => "Output",
            StatementKind::If => "If",
            StatementKind::ElseIf => "ElseIf",
            StatementKind::Else => "Else",
            StatementKind::EndIf => "EndIf",
            StatementKind::While => "While",
            StatementKind::EndWhile => "EndWhile",
            StatementKind::DoWhile => "DoWhile",
            StatementKind::EndDoWhile => "EndDoWhile",
            StatementKind::ForIncrement => "ForIncrement",
            StatementKind::ForDecrement => "ForDecrement",
            StatementKind::EndFor => "EndFor",
            StatementKind::DefineFunction => "DefineFunction",
            StatementKind::Defined => "Defined",
            StatementKind::CallUserFunction => "CallUserFunction",
            StatementKind::Break => "Break",
            StatementKind::Sub => "Sub",
            StatementKind::EndSub => "EndSub",
        };
        f.write_str(name)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single program line and the statements nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementNode {
    pub id: NodeId,
    pub kind: StatementKind,
    /// Rendered operand strings; the slot layout depends on `kind`.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Only meaningful for `Assign`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_constant: bool,
    /// Editor-only flag: children hidden in the tree view.
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StatementNode>,
}

impl StatementNode {
    /// Creates a childless node.
    pub fn new(id: impl Into<String>, kind: StatementKind, tokens: &[&str]) -> Self {
        Self {
            id: NodeId::new(id),
            kind,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            is_constant: false,
            collapsed: false,
            children: Vec::new(),
        }
    }

    /// Marks an `Assign` node as a constant declaration.
    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    /// Replaces the children of this node.
    pub fn with_children(mut self, children: Vec<StatementNode>) -> Self {
        self.children = children;
        self
    }

    /// Returns the token at `slot`, or an empty string if the slot is missing.
    pub fn token(&self, slot: usize) -> &str {
        self.tokens.get(slot).map(String::as_str).unwrap_or("")
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.tokens.hash(state);
        self.is_constant.hash(state);
        self.children.len().hash(state);
        for child in &self.children {
            child.hash_content(state);
        }
    }
}

/// A complete program: the ordered root statements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    pub statements: Vec<StatementNode>,
}

impl Program {
    pub fn new(statements: Vec<StatementNode>) -> Self {
        Self { statements }
    }

    /// Parses a program from its persisted JSON form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serializes the program to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of statements in the tree.
    pub fn len(&self) -> usize {
        self.statements.iter().map(StatementNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Hash of everything that affects validation and rendering.
    ///
    /// Node ids and the `collapsed` flag are excluded, so two trees that render
    /// identically hash identically.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.statements.len().hash(&mut hasher);
        for stmt in &self.statements {
            stmt.hash_content(&mut hasher);
        }
        hasher.finish()
    }

    /// Structural equality ignoring ids and editor flags.
    pub fn same_shape(&self, other: &Program) -> bool {
        fn eq(a: &[StatementNode], b: &[StatementNode]) -> bool {
            a.len() == b.len()
                && a.iter().zip(b).all(|(x, y)| {
                    x.kind == y.kind
                        && x.tokens == y.tokens
                        && x.is_constant == y.is_constant
                        && eq(&x.children, &y.children)
                })
        }
        eq(&self.statements, &other.statements)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(id: &str, kind: StatementKind, tokens: &[&str]) -> StatementNode {
        StatementNode::new(id, kind, tokens)
    }

    pub(crate) fn sample_program() -> Program {
        Program::new(vec![
            node("1", StatementKind::Assign, &["i", "0"]),
            node("2", StatementKind::While, &["i < 3"]).with_children(vec![
                node("3", StatementKind::Output, &["i"]),
                node("4", StatementKind::Increment, &["i", "1"]),
            ]),
            node("5", StatementKind::EndWhile, &[]),
        ])
    }

    #[test]
    fn test_expression_slots() {
        assert_eq!(StatementKind::ForIncrement.expression_slots(4), vec![0, 1, 2, 3]);
        assert_eq!(StatementKind::Output.expression_slots(3), vec![0, 1, 2]);
        assert_eq!(StatementKind::Assign.expression_slots(1), vec![0]);
        assert!(StatementKind::Sub.expression_slots(1).is_empty());
        assert!(StatementKind::CallUserFunction.is_list_slot(1));
        assert!(!StatementKind::Assign.is_list_slot(1));
    }

    #[test]
    fn test_json_round_trip() {
        let program = sample_program();
        let json = program.to_json().unwrap();
        let parsed = Program::from_json(&json).unwrap();
        assert_eq!(parsed, program);
    }

    #[test]
    fn test_json_shape() {
        let program = Program::new(vec![node("a", StatementKind::Assign, &["X", "1"]).constant()]);
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json[0]["kind"], "assign");
        assert_eq!(json[0]["isConstant"], true);
        assert!(json[0].get("children").is_none());
        assert!(json[0].get("depth").is_none());
    }

    #[test]
    fn test_json_defaults() {
        let program = Program::from_json(r#"[{"id": "1", "kind": "endIf"}]"#).unwrap();
        assert!(program.statements[0].tokens.is_empty());
        assert!(!program.statements[0].is_constant);
    }

    #[test]
    fn test_content_hash_ignores_ids_and_collapse() {
        let a = sample_program();
        let mut b = sample_program();
        b.statements[1].id = NodeId::new("other");
        b.statements[1].collapsed = true;
        assert_eq!(a.content_hash(), b.content_hash());

        b.statements[1].children[0].tokens[0] = "j".to_string();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_len_counts_nested() {
        assert_eq!(sample_program().len(), 5);
    }

    #[test]
    fn test_token_arity_covers_every_kind() {
        for kind in StatementKind::ALL {
            if kind.closes_block() {
                assert_eq!(kind.token_arity(), Some(0), "{kind}");
                assert!(!kind.is_scoping(), "{kind}");
            }
            if kind.opens_block() {
                assert!(kind.is_scoping(), "{kind}");
            }
        }
    }
}
