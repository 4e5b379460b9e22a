//! Shared test fixtures.

#![allow(dead_code)]

use talent_calc::config::CalcConfig;
use talent_calc::{Calculator, SelectionState, TalentTree};

/// A (1) -> B (2, two ranks) -> C (3, choice), all class nodes, 3 class points.
pub const CHAIN_TREE: &str = r#"{
    "treeId": 1,
    "specId": 64,
    "specName": "Frost",
    "className": "Mage",
    "pointLimits": { "class": 3 },
    "nodes": [
        { "id": 1, "treeIndex": 1, "entries": [{ "id": 10, "name": "Alpha" }] },
        { "id": 2, "treeIndex": 1, "maxRanks": 2, "entries": [{ "id": 20, "name": "Beta" }] },
        { "id": 3, "treeIndex": 1, "type": 2,
          "entries": [{ "id": 30, "name": "Gamma" }, { "id": 31, "name": "Delta" }] }
    ],
    "edges": [
        { "id": 100, "fromNodeId": 1, "toNodeId": 2 },
        { "id": 101, "fromNodeId": 2, "toNodeId": 3 }
    ]
}"#;

/// Diamond 1 -> {2, 3} -> 4 plus a lone root 5. Spec nodes, default limits.
pub const DIAMOND_TREE: &str = r#"{
    "treeId": 2,
    "specId": 65,
    "nodes": [
        { "id": 1, "entries": [{ "id": 10 }] },
        { "id": 2, "entries": [{ "id": 20 }] },
        { "id": 3, "entries": [{ "id": 30 }] },
        { "id": 4, "entries": [{ "id": 40 }] },
        { "id": 5, "entries": [{ "id": 50 }] }
    ],
    "edges": [
        { "id": 100, "fromNodeId": 1, "toNodeId": 2 },
        { "id": 101, "fromNodeId": 1, "toNodeId": 3 },
        { "id": 102, "fromNodeId": 2, "toNodeId": 4 },
        { "id": 103, "fromNodeId": 3, "toNodeId": 4 }
    ]
}"#;

/// Class and spec chains, two hero sub-trees (7 and 8), a sub-tree selection
/// node, and a hidden node that only hangs off the selection node.
pub const HERO_TREE: &str = r#"{
    "treeId": 3,
    "specId": 66,
    "pointLimits": { "class": 4, "spec": 4, "hero": 2 },
    "nodes": [
        { "id": 1, "treeIndex": 1, "entries": [{ "id": 10 }] },
        { "id": 2, "treeIndex": 1, "maxRanks": 3, "entries": [{ "id": 20 }] },
        { "id": 3, "treeIndex": 2, "entries": [{ "id": 30 }] },
        { "id": 4, "treeIndex": 2, "type": 2, "entries": [{ "id": 40 }, { "id": 41 }] },
        { "id": 50, "type": 3, "entries": [{ "id": 500 }, { "id": 501 }] },
        { "id": 51, "orderIndex": -1, "entries": [{ "id": 510 }] },
        { "id": 10, "subTreeId": 7, "entries": [{ "id": 100 }] },
        { "id": 11, "subTreeId": 7, "maxRanks": 2, "entries": [{ "id": 110 }] },
        { "id": 20, "subTreeId": 8, "entries": [{ "id": 200 }] },
        { "id": 21, "subTreeId": 8, "entries": [{ "id": 210 }] }
    ],
    "edges": [
        { "id": 1000, "fromNodeId": 1, "toNodeId": 2 },
        { "id": 1001, "fromNodeId": 3, "toNodeId": 4 },
        { "id": 1002, "fromNodeId": 50, "toNodeId": 51 },
        { "id": 1003, "fromNodeId": 10, "toNodeId": 11 },
        { "id": 1004, "fromNodeId": 20, "toNodeId": 21 }
    ],
    "subTrees": [
        { "id": 7, "name": "Templar" },
        { "id": 8, "name": "Herald" }
    ]
}"#;

pub fn tree(json: &str) -> TalentTree {
    TalentTree::from_json(json).expect("fixture tree should parse")
}

pub fn calculator(json: &str) -> Calculator {
    Calculator::new(tree(json), &CalcConfig::default())
}

pub fn selected_ids(state: &SelectionState) -> Vec<u32> {
    state.iter().map(|(id, _)| id).collect()
}

/// Spending stays within limits, every selected node has all its parents, and
/// hero points sit only in the active sub-tree.
pub fn assert_invariants(calc: &Calculator) {
    let tree = calc.tree();
    let spent = calc.spent();
    let limits = tree.point_limits();
    assert!(spent.class <= limits.class, "class over limit: {spent:?}");
    assert!(spent.spec <= limits.spec, "spec over limit: {spent:?}");
    assert!(spent.hero <= limits.hero, "hero over limit: {spent:?}");

    for (id, selection) in calc.selection().iter() {
        let node = tree.node(id).expect("selected node must be visible");
        if node.is_hero() {
            assert_eq!(
                Some(node.sub_tree_id),
                calc.engine().active_sub_tree(),
                "node {id} selected outside the active sub-tree"
            );
        }
        assert!(selection.ranks_purchased >= 1 && selection.ranks_purchased <= node.max_ranks);
        for parent in tree.edge_index().parents(id) {
            assert!(
                calc.selection().is_selected(*parent),
                "node {id} selected without parent {parent}"
            );
        }
    }
}
