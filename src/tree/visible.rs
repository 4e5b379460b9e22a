//! Visible-node computation.
//!
//! Seeds are nodes with a non-negative `orderIndex` plus baseline nodes that
//! have no incoming edge. Anything else becomes visible as soon as any one of
//! its parents is visible (OR semantics, unlike point spending which walks
//! every ancestor). Sub-tree selection nodes are never visible.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::{NodeType, TalentEdge, TalentNode};

pub(super) fn compute_visible(
    nodes: &BTreeMap<u32, TalentNode>,
    edges: &[TalentEdge],
) -> BTreeSet<u32> {
    let allocatable = |id: &u32| {
        nodes
            .get(id)
            .is_some_and(|n| n.node_type != NodeType::SubTreeSelection)
    };

    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut has_parent: BTreeSet<u32> = BTreeSet::new();
    for edge in edges {
        children.entry(edge.from_node_id).or_default().push(edge.to_node_id);
        has_parent.insert(edge.to_node_id);
    }

    let mut visible = BTreeSet::new();
    let mut queue = VecDeque::new();
    for node in nodes.values() {
        if !allocatable(&node.id) {
            continue;
        }
        if node.order_index >= 0 || !has_parent.contains(&node.id) {
            visible.insert(node.id);
            queue.push_back(node.id);
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some(next) = children.get(&id) else {
            continue;
        };
        for &child in next {
            if allocatable(&child) && visible.insert(child) {
                queue.push_back(child);
            }
        }
    }

    visible
}
