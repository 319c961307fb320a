//! Flattened (pre-order list) projection of the statement tree.
//!
//! The flattened list is what the drag-and-drop editor renders: every node
//! in pre-order, annotated with its parent id, depth and sibling index. All
//! descendants of a node follow it contiguously.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::{NodeId, Program, StatementKind, StatementNode};

/// A statement annotated with its position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedNode {
    pub id: NodeId,
    pub kind: StatementKind,
    pub tokens: Vec<String>,
    pub is_constant: bool,
    pub collapsed: bool,
    /// Lookup key of the parent; `None` for roots.
    pub parent_id: Option<NodeId>,
    /// Nesting level, `parent.depth + 1`.
    pub depth: usize,
    /// Position among the parent's children.
    pub index: usize,
}

impl FlattenedNode {
    fn from_node(node: &StatementNode, parent_id: Option<NodeId>, depth: usize, index: usize) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            tokens: node.tokens.clone(),
            is_constant: node.is_constant,
            collapsed: node.collapsed,
            parent_id,
            depth,
            index,
        }
    }

    fn to_node(&self) -> StatementNode {
        StatementNode {
            id: self.id.clone(),
            kind: self.kind,
            tokens: self.tokens.clone(),
            is_constant: self.is_constant,
            collapsed: self.collapsed,
            children: Vec::new(),
        }
    }

    /// Token at `slot`, empty when absent.
    pub fn token(&self, slot: usize) -> &str {
        self.tokens.get(slot).map(String::as_str).unwrap_or("")
    }
}

/// Flattens a program in pre-order.
pub fn flatten(program: &Program) -> Vec<FlattenedNode> {
    let mut out = Vec::with_capacity(program.len());
    flatten_into(&program.statements, None, 0, &mut out);
    out
}

fn flatten_into(
    nodes: &[StatementNode],
    parent_id: Option<&NodeId>,
    depth: usize,
    out: &mut Vec<FlattenedNode>,
) {
    for (index, node) in nodes.iter().enumerate() {
        out.push(FlattenedNode::from_node(node, parent_id.cloned(), depth, index));
        flatten_into(&node.children, Some(&node.id), depth + 1, out);
    }
}

/// Result of [`rebuild`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebuilt {
    pub program: Program,
    /// Ids whose `parent_id` could not be resolved. They were attached at
    /// the root so no statement is lost.
    pub orphans: Vec<NodeId>,
}

impl Rebuilt {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
    }
}

/// Rebuilds a tree from a flattened list.
///
/// Sibling order follows list order. Depth and index annotations are
/// ignored; only `parent_id` determines shape.
pub fn rebuild(items: &[FlattenedNode]) -> Rebuilt {
    let position: HashMap<&NodeId, usize> =
        items.iter().enumerate().map(|(i, item)| (&item.id, i)).collect();

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut parent_of: Vec<Option<usize>> = vec![None; items.len()];
    let mut orphans = Vec::new();

    for (i, item) in items.iter().enumerate() {
        match &item.parent_id {
            None => roots.push(i),
            Some(parent) => match position.get(parent) {
                Some(&p) if p != i => {
                    children[p].push(i);
                    parent_of[i] = Some(p);
                }
                _ => {
                    roots.push(i);
                    orphans.push(item.id.clone());
                }
            },
        }
    }

    // Parent cycles in the input leave nodes unreachable from any root.
    let mut reached = vec![false; items.len()];
    let mut stack: Vec<usize> = roots.clone();
    mark_reached(&mut stack, &children, &mut reached);
    for i in 0..items.len() {
        if reached[i] {
            continue;
        }
        if let Some(p) = parent_of[i].take() {
            children[p].retain(|&c| c != i);
        }
        roots.push(i);
        orphans.push(items[i].id.clone());
        stack.push(i);
        mark_reached(&mut stack, &children, &mut reached);
    }

    if !orphans.is_empty() {
        warn!(
            "rebuild attached {} statement(s) with unresolved parents at the root",
            orphans.len()
        );
    }

    let statements = roots
        .iter()
        .map(|&i| assemble(i, items, &children))
        .collect();

    Rebuilt {
        program: Program::new(statements),
        orphans,
    }
}

fn mark_reached(stack: &mut Vec<usize>, children: &[Vec<usize>], reached: &mut [bool]) {
    while let Some(i) = stack.pop() {
        if reached[i] {
            continue;
        }
        reached[i] = true;
        stack.extend(children[i].iter().copied());
    }
}

fn assemble(i: usize, items: &[FlattenedNode], children: &[Vec<usize>]) -> StatementNode {
    let mut node = items[i].to_node();
    node.children = children[i]
        .iter()
        .map(|&c| assemble(c, items, children))
        .collect();
    node
}

/// Drops every descendant of the given ids from a flattened list.
///
/// The ids themselves stay. Used while dragging so the active node cannot
/// be projected into its own subtree.
pub fn remove_children_of(items: &[FlattenedNode], ids: &[NodeId]) -> Vec<FlattenedNode> {
    let mut excluded: HashSet<NodeId> = ids.iter().cloned().collect();
    items
        .iter()
        .filter(|item| match &item.parent_id {
            Some(parent) if excluded.contains(parent) => {
                excluded.insert(item.id.clone());
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}
