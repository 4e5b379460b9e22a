//! Static talent tree model.
//!
//! A tree is loaded once per specialization and never mutated afterwards.
//! Loading validates the raw JSON shape, resolves node categories, computes
//! which nodes are visible, and builds the [`EdgeIndex`] over visible edges.
//! Everything downstream (engine, budget checks, loadout decoding) only sees
//! visible nodes.

pub mod closure;
pub mod edges;
pub mod raw;
mod visible;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::Selection;
pub use closure::{dependent_closure, prerequisite_closure};
pub use edges::EdgeIndex;
pub use raw::{RawNode, RawPointLimits, RawTree};

/// Highest rank count a node may declare (ranks are 6 bits in a loadout).
pub const MAX_NODE_RANKS: u32 = 63;

/// Most nodes a tree may hold (the loadout node count is 16 bits).
pub const MAX_TREE_NODES: usize = u16::MAX as usize;

/// Error raised while turning raw tree data into a [`TalentTree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid tree data [{field}]: {message}")]
    Invalid { field: String, message: String },

    #[error("duplicate node id {0}")]
    DuplicateNode(u32),

    #[error("edge {edge} references unknown node {node}")]
    DanglingEdge { edge: u32, node: u32 },
}

impl TreeError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        TreeError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Point category a node spends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeKind {
    Class,
    Spec,
    Hero,
}

impl TreeKind {
    pub const ALL: [TreeKind; 3] = [TreeKind::Class, TreeKind::Spec, TreeKind::Hero];

    /// Map a `treeIndex` value (1 = class, 2 = spec, 3 = hero).
    pub fn from_tree_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(TreeKind::Class),
            2 => Some(TreeKind::Spec),
            3 => Some(TreeKind::Hero),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TreeKind::Class => "class",
            TreeKind::Spec => "spec",
            TreeKind::Hero => "hero",
        }
    }
}

impl std::fmt::Display for TreeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Node type as stored in trait data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Single,
    Tiered,
    Choice,
    /// Picks a hero sub-tree; never allocatable.
    SubTreeSelection,
}

impl NodeType {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(NodeType::Single),
            1 => Some(NodeType::Tiered),
            2 => Some(NodeType::Choice),
            3 => Some(NodeType::SubTreeSelection),
            _ => None,
        }
    }
}

/// Per-category spending caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLimits {
    pub class: u32,
    pub spec: u32,
    pub hero: u32,
}

impl Default for PointLimits {
    fn default() -> Self {
        Self {
            class: 31,
            spec: 30,
            hero: 10,
        }
    }
}

impl PointLimits {
    pub fn get(&self, kind: TreeKind) -> u32 {
        match kind {
            TreeKind::Class => self.class,
            TreeKind::Spec => self.spec,
            TreeKind::Hero => self.hero,
        }
    }
}

/// One alternative effect of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentEntry {
    pub id: u32,
    #[serde(default)]
    pub definition_id: u32,
    #[serde(default)]
    pub spell_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_file_name: String,
}

/// Directed prerequisite: `from_node_id` must be selected before `to_node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentEdge {
    pub id: u32,
    pub from_node_id: u32,
    pub to_node_id: u32,
    #[serde(default)]
    pub visual_style: u8,
}

/// Optional node partition (hero talents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTree {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_file_name: String,
}

/// One allocatable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentNode {
    pub id: u32,
    pub node_type: NodeType,
    pub max_ranks: u8,
    pub entries: Vec<TalentEntry>,
    /// 0 for the main tree, otherwise the owning sub-tree.
    pub sub_tree_id: u32,
    pub kind: TreeKind,
    /// Negative for nodes outside the default loadout ordering.
    pub order_index: i32,
}

impl TalentNode {
    pub fn is_choice(&self) -> bool {
        self.node_type == NodeType::Choice && self.entries.len() > 1
    }

    pub fn is_hero(&self) -> bool {
        self.sub_tree_id > 0
    }

    /// Minimal allocation used when the node gets selected: one rank, first choice.
    pub fn default_selection(&self) -> Selection {
        Selection {
            ranks_purchased: self.max_ranks.min(1),
            choice_index: self.is_choice().then_some(0),
        }
    }
}

/// Immutable graph model for one specialization.
#[derive(Debug, Clone)]
pub struct TalentTree {
    pub tree_id: u32,
    pub spec_id: u32,
    pub spec_name: String,
    pub class_name: String,
    point_limits: PointLimits,
    nodes: BTreeMap<u32, TalentNode>,
    edges: Vec<TalentEdge>,
    sub_trees: Vec<SubTree>,
    visible: BTreeSet<u32>,
    index: EdgeIndex,
}

impl TalentTree {
    /// Parse a tree from JSON, using the built-in point limits as fallback.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let raw: RawTree = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw, &PointLimits::default())?)
    }

    /// Read and parse a tree file.
    pub fn load(path: &Path, default_limits: &PointLimits) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawTree = serde_json::from_str(&contents)?;
        let tree = Self::from_raw(raw, default_limits)?;
        tracing::debug!(
            "Loaded tree {} from {} ({} nodes, {} visible)",
            tree.tree_id,
            path.display(),
            tree.nodes.len(),
            tree.visible.len()
        );
        Ok(tree)
    }

    /// Validate raw data and build the model.
    pub fn from_raw(raw: RawTree, default_limits: &PointLimits) -> Result<Self, TreeError> {
        if raw.nodes.len() > MAX_TREE_NODES {
            return Err(TreeError::invalid(
                "nodes",
                format!("{} nodes, at most {MAX_TREE_NODES} allowed", raw.nodes.len()),
            ));
        }

        let mut nodes = BTreeMap::new();
        for (i, raw_node) in raw.nodes.into_iter().enumerate() {
            let node = raw_node.validate(i)?;
            if nodes.contains_key(&node.id) {
                return Err(TreeError::DuplicateNode(node.id));
            }
            nodes.insert(node.id, node);
        }

        for (i, edge) in raw.edges.iter().enumerate() {
            for node in [edge.from_node_id, edge.to_node_id] {
                if !nodes.contains_key(&node) {
                    return Err(TreeError::DanglingEdge { edge: edge.id, node });
                }
            }
            if edge.from_node_id == edge.to_node_id {
                return Err(TreeError::invalid(
                    format!("edges[{i}]"),
                    format!("node {} requires itself", edge.from_node_id),
                ));
            }
        }

        let point_limits = raw
            .point_limits
            .map(|limits| limits.resolve(default_limits))
            .unwrap_or(*default_limits);

        let visible = visible::compute_visible(&nodes, &raw.edges);
        let index = EdgeIndex::build(
            raw.edges
                .iter()
                .filter(|e| visible.contains(&e.from_node_id) && visible.contains(&e.to_node_id)),
        );

        Ok(Self {
            tree_id: raw.tree_id,
            spec_id: raw.spec_id,
            spec_name: raw.spec_name,
            class_name: raw.class_name,
            point_limits,
            nodes,
            edges: raw.edges,
            sub_trees: raw.sub_trees,
            visible,
            index,
        })
    }

    /// Look up a visible node.
    pub fn node(&self, id: u32) -> Option<&TalentNode> {
        if self.visible.contains(&id) {
            self.nodes.get(&id)
        } else {
            None
        }
    }

    pub fn is_visible(&self, id: u32) -> bool {
        self.visible.contains(&id)
    }

    /// Every node in the source data, visible or not, by ascending id.
    pub fn all_nodes(&self) -> impl Iterator<Item = &TalentNode> {
        self.nodes.values()
    }

    /// Allocatable nodes by ascending id.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &TalentNode> {
        self.visible.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> &[TalentEdge] {
        &self.edges
    }

    pub fn sub_trees(&self) -> &[SubTree] {
        &self.sub_trees
    }

    pub fn sub_tree(&self, id: u32) -> Option<&SubTree> {
        self.sub_trees.iter().find(|s| s.id == id)
    }

    pub fn point_limits(&self) -> &PointLimits {
        &self.point_limits
    }

    pub fn edge_index(&self) -> &EdgeIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Result<TalentTree, TreeError> {
        let raw: RawTree = serde_json::from_value(value).unwrap();
        TalentTree::from_raw(raw, &PointLimits::default())
    }

    #[test]
    fn test_defaults_and_categories() {
        let t = tree(json!({
            "treeId": 7,
            "specId": 64,
            "nodes": [
                { "id": 1, "entries": [{ "id": 10 }], "treeIndex": 1 },
                { "id": 2, "entries": [{ "id": 20 }] },
                { "id": 3, "entries": [{ "id": 30 }], "subTreeId": 5, "treeIndex": 2 },
            ],
        }))
        .unwrap();

        assert_eq!(t.point_limits(), &PointLimits::default());
        assert_eq!(t.node(1).unwrap().kind, TreeKind::Class);
        assert_eq!(t.node(2).unwrap().kind, TreeKind::Spec);
        // Sub-tree membership wins over treeIndex.
        assert_eq!(t.node(3).unwrap().kind, TreeKind::Hero);
        assert_eq!(t.node(2).unwrap().max_ranks, 1);
    }

    #[test]
    fn test_partial_point_limits_fall_back_per_field() {
        let t = tree(json!({
            "treeId": 1,
            "specId": 1,
            "pointLimits": { "class": 3 },
            "nodes": [],
        }))
        .unwrap();
        assert_eq!(t.point_limits().class, 3);
        assert_eq!(t.point_limits().spec, 30);
        assert_eq!(t.point_limits().hero, 10);
    }

    #[test]
    fn test_invalid_field_is_reported_with_path() {
        let err = tree(json!({
            "treeId": 1,
            "specId": 1,
            "nodes": [
                { "id": 1, "entries": [{ "id": 10 }] },
                { "id": 2, "entries": [{ "id": 20 }], "maxRanks": 0 },
            ],
        }))
        .unwrap_err();
        match err {
            TreeError::Invalid { field, .. } => assert_eq!(field, "nodes[1].maxRanks"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_two_entries_require_choice_type() {
        let err = tree(json!({
            "treeId": 1,
            "specId": 1,
            "nodes": [{ "id": 1, "entries": [{ "id": 10 }, { "id": 11 }] }],
        }))
        .unwrap_err();
        assert!(matches!(err, TreeError::Invalid { ref field, .. } if field == "nodes[0].entries"));
    }

    #[test]
    fn test_duplicate_and_dangling() {
        let dup = tree(json!({
            "treeId": 1,
            "specId": 1,
            "nodes": [
                { "id": 1, "entries": [{ "id": 10 }] },
                { "id": 1, "entries": [{ "id": 11 }] },
            ],
        }));
        assert_eq!(dup.unwrap_err(), TreeError::DuplicateNode(1));

        let dangling = tree(json!({
            "treeId": 1,
            "specId": 1,
            "nodes": [{ "id": 1, "entries": [{ "id": 10 }] }],
            "edges": [{ "id": 100, "fromNodeId": 1, "toNodeId": 9 }],
        }));
        assert_eq!(
            dangling.unwrap_err(),
            TreeError::DanglingEdge { edge: 100, node: 9 }
        );
    }

    #[test]
    fn test_node_count_is_bounded() {
        let nodes: Vec<serde_json::Value> = (0..=MAX_TREE_NODES as u32)
            .map(|id| json!({ "id": id, "entries": [{ "id": id }] }))
            .collect();
        let err = tree(json!({ "treeId": 1, "specId": 1, "nodes": nodes })).unwrap_err();
        assert!(matches!(err, TreeError::Invalid { ref field, .. } if field == "nodes"));
    }

    #[test]
    fn test_default_selection() {
        let t = tree(json!({
            "treeId": 1,
            "specId": 1,
            "nodes": [
                { "id": 1, "entries": [{ "id": 10 }], "maxRanks": 3 },
                { "id": 2, "type": 2, "entries": [{ "id": 20 }, { "id": 21 }] },
            ],
        }))
        .unwrap();
        let tiered = t.node(1).unwrap().default_selection();
        assert_eq!(tiered.ranks_purchased, 1);
        assert_eq!(tiered.choice_index, None);
        let choice = t.node(2).unwrap().default_selection();
        assert_eq!(choice.choice_index, Some(0));
    }
}
