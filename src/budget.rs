//! Point-limit checks run before any allocation is committed.

use crate::selection::{PointsSpent, SelectionState};
use crate::tree::{PointLimits, TalentNode, TalentTree, TreeKind, prerequisite_closure};

/// First category that would go over its limit if `ranks` more ranks were
/// bought on an already-selected node.
pub fn would_exceed_point_limit(
    node: &TalentNode,
    ranks: u32,
    spent: &PointsSpent,
    limits: &PointLimits,
) -> Option<TreeKind> {
    (spent.get(node.kind) + ranks > limits.get(node.kind)).then_some(node.kind)
}

/// First category that would go over its limit if `node_id` were selected
/// along with every missing ancestor, each at its minimal allocation.
pub fn would_exceed_point_limit_with_prereqs(
    node_id: u32,
    tree: &TalentTree,
    state: &SelectionState,
    spent: &PointsSpent,
    limits: &PointLimits,
) -> Option<TreeKind> {
    let incremental = prerequisite_cost(node_id, tree, state);
    TreeKind::ALL
        .into_iter()
        .find(|&kind| spent.get(kind) + incremental.get(kind) > limits.get(kind))
}

/// Points that selecting `node_id` with its missing ancestors would add.
pub fn prerequisite_cost(node_id: u32, tree: &TalentTree, state: &SelectionState) -> PointsSpent {
    let mut cost = PointsSpent::default();
    for id in prerequisite_closure(node_id, tree.edge_index()) {
        if state.is_selected(id) {
            continue;
        }
        let Some(node) = tree.node(id) else {
            continue;
        };
        cost.add(node.kind, u32::from(node.default_selection().ranks_purchased));
    }
    cost
}
