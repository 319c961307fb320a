//! Drag projection: where a dragged statement would land.
//!
//! While the user drags a node vertically over `over` and horizontally by
//! some offset, the editor needs the depth and parent the node would get if
//! dropped now. The reorder is simulated on the flattened list; the node may
//! nest at most one level below its new predecessor and may not be
//! shallower than its new successor.
//!
//! ```text
//!   previous (depth p)      max_depth = p + 1
//! > active   (depth ?)      depth = clamp(active.depth + round(dx / indent))
//!   next     (depth n)      min_depth = n
//! ```

use log::debug;

use super::flatten::{FlattenedNode, flatten, remove_children_of};
use super::{NodeId, Program, TreeError};

/// Outcome of a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub depth: usize,
    pub parent_id: Option<NodeId>,
    pub min_depth: usize,
    pub max_depth: usize,
}

/// Rounds half toward positive infinity, matching pointer-offset rounding
/// in browsers.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Projects `active` onto the slot currently occupied by `over`.
///
/// `items` should already exclude the descendants of `active` (see
/// [`project_drag`]).
pub fn project(
    items: &[FlattenedNode],
    active: &NodeId,
    over: &NodeId,
    horizontal_offset: f64,
    indent_unit: f64,
) -> Result<Projection, TreeError> {
    if !(indent_unit > 0.0) {
        return Err(TreeError::InvalidIndent(indent_unit));
    }

    let active_index = items
        .iter()
        .position(|item| &item.id == active)
        .ok_or_else(|| TreeError::not_found(active))?;
    let over_index = items
        .iter()
        .position(|item| &item.id == over)
        .ok_or_else(|| TreeError::not_found(over))?;

    let mut reordered: Vec<&FlattenedNode> = items.iter().collect();
    let moving = reordered.remove(active_index);
    reordered.insert(over_index, moving);

    let previous = over_index
        .checked_sub(1)
        .and_then(|i| reordered.get(i))
        .copied();
    let next = reordered.get(over_index + 1).copied();

    let max_depth = previous.map_or(0, |p| p.depth + 1);
    let min_depth = next.map_or(0, |n| n.depth).min(max_depth);

    let drag_depth = round_half_up(horizontal_offset / indent_unit);
    let desired = items[active_index].depth as i64 + drag_depth;
    let depth = desired.clamp(min_depth as i64, max_depth as i64) as usize;

    let parent_id = match previous {
        _ if depth == 0 => None,
        None => None,
        Some(prev) if depth == prev.depth => prev.parent_id.clone(),
        Some(prev) if depth > prev.depth => Some(prev.id.clone()),
        Some(_) => reordered[..over_index]
            .iter()
            .rev()
            .find(|item| item.depth == depth)
            .and_then(|item| item.parent_id.clone()),
    };

    debug!(
        "projected {} over {}: depth {} in [{}, {}], parent {:?}",
        active, over, depth, min_depth, max_depth, parent_id
    );

    Ok(Projection {
        depth,
        parent_id,
        min_depth,
        max_depth,
    })
}

/// Projects a drag over a whole program.
///
/// Descendants of the active node and of collapsed nodes are hidden during
/// a drag, exactly as the tree view shows them.
pub fn project_drag(
    program: &Program,
    active: &NodeId,
    over: &NodeId,
    horizontal_offset: f64,
    indent_unit: f64,
) -> Result<Projection, TreeError> {
    let flat = flatten(program);
    let mut hidden: Vec<NodeId> = flat
        .iter()
        .filter(|item| item.collapsed && &item.id != active)
        .map(|item| item.id.clone())
        .collect();
    hidden.push(active.clone());
    let visible = remove_children_of(&flat, &hidden);
    project(&visible, active, over, horizontal_offset, indent_unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatementKind;
    use crate::model::tests::node;

    const INDENT: f64 = 20.0;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    /// a
    ///   b
    ///   c
    /// d
    fn shallow() -> Vec<FlattenedNode> {
        flatten(&Program::new(vec![
            node("a", StatementKind::While, &["x"]).with_children(vec![
                node("b", StatementKind::Output, &["x"]),
                node("c", StatementKind::Output, &["y"]),
            ]),
            node("d", StatementKind::EndWhile, &[]),
        ]))
    }

    /// a
    ///   b
    ///     c
    /// d
    fn deep() -> Vec<FlattenedNode> {
        flatten(&Program::new(vec![
            node("a", StatementKind::If, &["x"]).with_children(vec![
                node("b", StatementKind::While, &["y"])
                    .with_children(vec![node("c", StatementKind::Break, &[])]),
            ]),
            node("d", StatementKind::Output, &["z"]),
        ]))
    }

    #[test]
    fn test_depth_zero_has_no_parent() {
        let p = project(&shallow(), &id("d"), &id("d"), 0.0, INDENT).unwrap();
        assert_eq!(p.depth, 0);
        assert_eq!(p.parent_id, None);
        assert_eq!((p.min_depth, p.max_depth), (0, 2));
    }

    #[test]
    fn test_same_depth_as_previous_shares_its_parent() {
        let p = project(&shallow(), &id("d"), &id("d"), INDENT, INDENT).unwrap();
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id, Some(id("a")));
    }

    #[test]
    fn test_deeper_than_previous_nests_inside_it() {
        let p = project(&shallow(), &id("d"), &id("d"), 2.0 * INDENT, INDENT).unwrap();
        assert_eq!(p.depth, 2);
        assert_eq!(p.parent_id, Some(id("c")));
    }

    #[test]
    fn test_shallower_than_previous_walks_back() {
        let p = project(&deep(), &id("d"), &id("d"), INDENT, INDENT).unwrap();
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id, Some(id("a")));
    }

    #[test]
    fn test_clamped_to_max() {
        let p = project(&shallow(), &id("d"), &id("d"), 10.0 * INDENT, INDENT).unwrap();
        assert_eq!(p.depth, p.max_depth);
    }

    #[test]
    fn test_min_depth_follows_next_item() {
        // Dragging d up over b puts it between a and b; it cannot be
        // shallower than b.
        let p = project(&shallow(), &id("d"), &id("b"), -5.0 * INDENT, INDENT).unwrap();
        assert_eq!(p.min_depth, 1);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id, Some(id("a")));
    }

    #[test]
    fn test_rounding_half_up() {
        let p = project(&shallow(), &id("d"), &id("d"), 0.5 * INDENT, INDENT).unwrap();
        assert_eq!(p.depth, 1);
        let p = project(&shallow(), &id("d"), &id("d"), 0.49 * INDENT, INDENT).unwrap();
        assert_eq!(p.depth, 0);
    }

    #[test]
    fn test_monotone_in_offset() {
        let items = deep();
        let mut last = 0;
        for step in -10..=10 {
            let offset = step as f64 * INDENT / 2.0;
            let p = project(&items, &id("d"), &id("d"), offset, INDENT).unwrap();
            assert!(p.depth >= last, "offset {offset}");
            assert!(p.min_depth <= p.depth && p.depth <= p.max_depth);
            last = p.depth;
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            project(&shallow(), &id("zz"), &id("a"), 0.0, INDENT),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            project(&shallow(), &id("a"), &id("b"), 0.0, 0.0),
            Err(TreeError::InvalidIndent(_))
        ));
    }

    #[test]
    fn test_project_drag_hides_active_subtree() {
        let program = Program::new(vec![
            node("a", StatementKind::Output, &["1"]),
            node("w", StatementKind::While, &["x"])
                .with_children(vec![node("b", StatementKind::Output, &["x"])]),
            node("e", StatementKind::EndWhile, &[]),
        ]);
        assert!(project_drag(&program, &id("w"), &id("b"), 0.0, INDENT).is_err());

        let p = project_drag(&program, &id("w"), &id("a"), 0.0, INDENT).unwrap();
        assert_eq!(p.depth, 0);
        let moved = program.apply_projection(&id("w"), &id("a"), &p).unwrap();
        let ids: Vec<_> = moved.statements.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["w", "a", "e"]);
        assert_eq!(moved.statements[0].children.len(), 1);
    }
}
