//! Structural edits and derived queries on [`Program`].
//!
//! Every edit leaves `self` untouched and returns the edited tree, so the
//! flattened view an editor holds is never invalidated behind its back.

use super::flatten::{flatten, rebuild};
use super::{NodeId, Program, Projection, StatementNode, TreeError};

/// Boolean node fields that can be updated through [`Program::set_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeProperty {
    /// Editor flag hiding the node's children.
    Collapsed,
    /// `is_constant` on `Assign` nodes.
    Constant,
}

fn find_in<'a>(nodes: &'a [StatementNode], id: &NodeId) -> Option<&'a StatementNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [StatementNode], id: &NodeId) -> Option<&'a mut StatementNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn detach(nodes: &mut Vec<StatementNode>, id: &NodeId) -> Option<StatementNode> {
    if let Some(pos) = nodes.iter().position(|n| &n.id == id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|node| detach(&mut node.children, id))
}

fn collect_ids(node: &StatementNode, out: &mut Vec<NodeId>) {
    out.push(node.id.clone());
    for child in &node.children {
        collect_ids(child, out);
    }
}

fn count_leaves(node: &StatementNode) -> usize {
    node.children
        .iter()
        .map(|child| {
            if child.children.is_empty() {
                1
            } else {
                count_leaves(child)
            }
        })
        .sum()
}

impl Program {
    /// Finds a node anywhere in the tree.
    pub fn find(&self, id: &NodeId) -> Option<&StatementNode> {
        find_in(&self.statements, id)
    }

    fn require(&self, id: &NodeId) -> Result<&StatementNode, TreeError> {
        self.find(id).ok_or_else(|| TreeError::not_found(id))
    }

    /// Depth of a node, `0` for roots.
    pub fn depth_of(&self, id: &NodeId) -> Result<usize, TreeError> {
        flatten(self)
            .into_iter()
            .find(|item| &item.id == id)
            .map(|item| item.depth)
            .ok_or_else(|| TreeError::not_found(id))
    }

    /// Inserts `node` (with its subtree) as child `index` of `parent`, or as
    /// root statement `index` when `parent` is `None`.
    pub fn insert(
        &self,
        parent: Option<&NodeId>,
        index: usize,
        node: StatementNode,
    ) -> Result<Program, TreeError> {
        let mut incoming = Vec::new();
        collect_ids(&node, &mut incoming);
        for id in &incoming {
            if self.find(id).is_some() {
                return Err(TreeError::DuplicateId { id: id.clone() });
            }
        }

        let mut program = self.clone();
        let siblings = match parent {
            None => &mut program.statements,
            Some(parent_id) => {
                &mut find_in_mut(&mut program.statements, parent_id)
                    .ok_or_else(|| TreeError::not_found(parent_id))?
                    .children
            }
        };
        if index > siblings.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, node);
        Ok(program)
    }

    /// Removes a node and its whole subtree.
    pub fn remove(&self, id: &NodeId) -> Result<Program, TreeError> {
        let mut program = self.clone();
        detach(&mut program.statements, id).ok_or_else(|| TreeError::not_found(id))?;
        Ok(program)
    }

    /// Moves `active` (with its subtree) to child `index` of `new_parent`.
    ///
    /// `new_depth` must equal the depth the node will have under
    /// `new_parent`. Depths inside the moved subtree follow its root. The
    /// index counts positions after the node has been detached.
    pub fn move_node(
        &self,
        active: &NodeId,
        new_depth: usize,
        new_parent: Option<&NodeId>,
        index: usize,
    ) -> Result<Program, TreeError> {
        self.require(active)?;

        let parent_depth = match new_parent {
            None => None,
            Some(parent_id) => {
                if self.children_ids(active, true)?.contains(parent_id) {
                    return Err(TreeError::CycleDetected { id: active.clone() });
                }
                Some(self.depth_of(parent_id)?)
            }
        };
        let expected = parent_depth.map_or(0, |d| d + 1);
        if new_depth != expected {
            return Err(TreeError::DepthMismatch {
                requested: new_depth,
                parent_depth,
            });
        }

        let mut program = self.clone();
        let Some(node) = detach(&mut program.statements, active) else {
            return Err(TreeError::not_found(active));
        };
        program.insert(new_parent, index, node)
    }

    /// Commits a drag: moves `active` to the slot of `over` using the depth
    /// and parent computed by [`crate::model::project`].
    pub fn apply_projection(
        &self,
        active: &NodeId,
        over: &NodeId,
        projection: &Projection,
    ) -> Result<Program, TreeError> {
        let subtree = self.children_ids(active, true)?;
        if let Some(parent) = &projection.parent_id
            && subtree.contains(parent)
        {
            return Err(TreeError::CycleDetected { id: active.clone() });
        }

        let mut items = flatten(self);
        let from = items
            .iter()
            .position(|item| &item.id == active)
            .ok_or_else(|| TreeError::not_found(active))?;
        let to = items
            .iter()
            .position(|item| &item.id == over)
            .ok_or_else(|| TreeError::not_found(over))?;
        if over != active && subtree.contains(over) {
            return Err(TreeError::CycleDetected { id: active.clone() });
        }

        items[from].depth = projection.depth;
        items[from].parent_id = projection.parent_id.clone();
        let moved = items.remove(from);
        items.insert(to, moved);

        Ok(rebuild(&items).program)
    }

    /// Applies `updater` to one boolean field of a node.
    ///
    /// The updater runs exactly once per call; a toggle is `|v| !v`.
    pub fn set_property(
        &self,
        id: &NodeId,
        property: NodeProperty,
        updater: impl FnOnce(bool) -> bool,
    ) -> Result<Program, TreeError> {
        let mut program = self.clone();
        let node =
            find_in_mut(&mut program.statements, id).ok_or_else(|| TreeError::not_found(id))?;
        let field = match property {
            NodeProperty::Collapsed => &mut node.collapsed,
            NodeProperty::Constant => &mut node.is_constant,
        };
        *field = updater(*field);
        Ok(program)
    }

    /// Number of leaf statements below `id` (not counting `id` itself).
    pub fn count_descendant_leaves(&self, id: &NodeId) -> Result<usize, TreeError> {
        Ok(count_leaves(self.require(id)?))
    }

    /// Ids of the subtree rooted at `id`, in pre-order.
    pub fn children_ids(&self, id: &NodeId, include_self: bool) -> Result<Vec<NodeId>, TreeError> {
        let mut ids = Vec::new();
        collect_ids(self.require(id)?, &mut ids);
        if !include_self {
            ids.remove(0);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatementKind;
    use crate::model::tests::{node, sample_program};

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn root_ids(program: &Program) -> Vec<&str> {
        program.statements.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_find_nested() {
        let program = sample_program();
        assert_eq!(program.find(&id("4")).unwrap().kind, StatementKind::Increment);
        assert!(program.find(&id("nope")).is_none());
    }

    #[test]
    fn test_insert_root_and_child() {
        let program = sample_program()
            .insert(None, 0, node("0", StatementKind::Output, &["\"start\""]))
            .unwrap()
            .insert(Some(&id("2")), 2, node("6", StatementKind::Break, &[]))
            .unwrap();
        assert_eq!(root_ids(&program), vec!["0", "1", "2", "5"]);
        assert_eq!(program.statements[2].children[2].id, id("6"));
    }

    #[test]
    fn test_insert_rejects_duplicate_and_bad_index() {
        let program = sample_program();
        assert!(matches!(
            program.insert(None, 0, node("3", StatementKind::Break, &[])),
            Err(TreeError::DuplicateId { .. })
        ));
        assert!(matches!(
            program.insert(None, 9, node("9", StatementKind::Break, &[])),
            Err(TreeError::IndexOutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_remove_subtree() {
        let program = sample_program().remove(&id("2")).unwrap();
        assert_eq!(root_ids(&program), vec!["1", "5"]);
        assert_eq!(program.len(), 2);
        assert!(sample_program().remove(&id("x")).is_err());
    }

    #[test]
    fn test_move_out_of_block() {
        let program = sample_program().move_node(&id("3"), 0, None, 0).unwrap();
        assert_eq!(root_ids(&program), vec!["3", "1", "2", "5"]);
        assert_eq!(program.find(&id("2")).unwrap().children.len(), 1);
    }

    #[test]
    fn test_move_keeps_subtree() {
        let program = sample_program()
            .insert(None, 3, node("6", StatementKind::If, &["a"]))
            .unwrap()
            .move_node(&id("2"), 1, Some(&id("6")), 0)
            .unwrap();
        let moved = program.find(&id("2")).unwrap();
        assert_eq!(moved.children.len(), 2);
        assert_eq!(program.depth_of(&id("3")).unwrap(), 2);
    }

    #[test]
    fn test_move_rejects_cycle_and_depth() {
        let program = sample_program();
        assert!(matches!(
            program.move_node(&id("2"), 2, Some(&id("3")), 0),
            Err(TreeError::CycleDetected { .. })
        ));
        assert!(matches!(
            program.move_node(&id("1"), 3, Some(&id("2")), 0),
            Err(TreeError::DepthMismatch { requested: 3, .. })
        ));
    }

    #[test]
    fn test_set_property_toggles_once() {
        let program = sample_program();
        let toggled = program
            .set_property(&id("2"), NodeProperty::Collapsed, |v| !v)
            .unwrap();
        assert!(toggled.find(&id("2")).unwrap().collapsed);
        assert!(!program.find(&id("2")).unwrap().collapsed);

        let back = toggled
            .set_property(&id("2"), NodeProperty::Collapsed, |v| !v)
            .unwrap();
        assert!(!back.find(&id("2")).unwrap().collapsed);
    }

    #[test]
    fn test_set_constant() {
        let program = sample_program()
            .set_property(&id("1"), NodeProperty::Constant, |_| true)
            .unwrap();
        assert!(program.statements[0].is_constant);
    }

    #[test]
    fn test_derived_queries() {
        let program = sample_program();
        assert_eq!(program.count_descendant_leaves(&id("2")).unwrap(), 2);
        assert_eq!(program.count_descendant_leaves(&id("1")).unwrap(), 0);
        assert_eq!(
            program.children_ids(&id("2"), true).unwrap(),
            vec![id("2"), id("3"), id("4")]
        );
        assert_eq!(
            program.children_ids(&id("2"), false).unwrap(),
            vec![id("3"), id("4")]
        );
    }

    #[test]
    fn test_apply_projection_nests_under_previous() {
        let program = Program::new(vec![
            node("a", StatementKind::While, &["x"]),
            node("b", StatementKind::Output, &["x"]),
            node("c", StatementKind::EndWhile, &[]),
        ]);
        let projection = Projection {
            depth: 1,
            parent_id: Some(id("a")),
            min_depth: 0,
            max_depth: 1,
        };
        let moved = program.apply_projection(&id("b"), &id("b"), &projection).unwrap();
        assert_eq!(root_ids(&moved), vec!["a", "c"]);
        assert_eq!(moved.statements[0].children[0].id, id("b"));
    }
}
