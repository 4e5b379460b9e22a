//! Serialized tree shape, as produced by the trait data exporter.
//!
//! Fields the engine has no use for (positions, icons on nodes) are ignored
//! by serde. Missing optional fields fall back to the exporter's defaults.

use serde::{Deserialize, Serialize};

use super::{
    MAX_NODE_RANKS, NodeType, PointLimits, SubTree, TalentEdge, TalentEntry, TalentNode,
    TreeError, TreeKind,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTree {
    pub tree_id: u32,
    pub spec_id: u32,
    #[serde(default)]
    pub spec_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub point_limits: Option<RawPointLimits>,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<TalentEdge>,
    #[serde(default)]
    pub sub_trees: Vec<SubTree>,
}

/// Point limits where each category may be omitted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RawPointLimits {
    pub class: Option<u32>,
    pub spec: Option<u32>,
    pub hero: Option<u32>,
}

impl RawPointLimits {
    pub fn resolve(self, defaults: &PointLimits) -> PointLimits {
        PointLimits {
            class: self.class.unwrap_or(defaults.class),
            spec: self.spec.unwrap_or(defaults.spec),
            hero: self.hero.unwrap_or(defaults.hero),
        }
    }
}

fn default_max_ranks() -> u32 { 1 }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub node_type: u8,
    #[serde(default = "default_max_ranks")]
    pub max_ranks: u32,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub sub_tree_id: u32,
    /// 1 = class, 2 = spec, 3 = hero. Missing means spec (or hero for sub-tree nodes).
    #[serde(default)]
    pub tree_index: Option<u8>,
    #[serde(default)]
    pub entries: Vec<TalentEntry>,
}

impl RawNode {
    /// Check field ranges; `index` is the node's position in the source array.
    pub fn validate(self, index: usize) -> Result<TalentNode, TreeError> {
        let field = |name: &str| format!("nodes[{index}].{name}");

        let node_type = NodeType::from_raw(self.node_type).ok_or_else(|| {
            TreeError::invalid(field("type"), format!("unknown node type {}", self.node_type))
        })?;

        if self.max_ranks == 0 || self.max_ranks > MAX_NODE_RANKS {
            return Err(TreeError::invalid(
                field("maxRanks"),
                format!("expected 1..={MAX_NODE_RANKS}, got {}", self.max_ranks),
            ));
        }

        match self.entries.len() {
            1 => {}
            2 if matches!(node_type, NodeType::Choice | NodeType::SubTreeSelection) => {}
            2 => {
                return Err(TreeError::invalid(
                    field("entries"),
                    "two entries on a non-choice node",
                ));
            }
            n => {
                return Err(TreeError::invalid(
                    field("entries"),
                    format!("expected 1 or 2 entries, got {n}"),
                ));
            }
        }

        let kind = if self.sub_tree_id > 0 {
            TreeKind::Hero
        } else {
            match self.tree_index {
                None => TreeKind::Spec,
                Some(i) => TreeKind::from_tree_index(i).ok_or_else(|| {
                    TreeError::invalid(field("treeIndex"), format!("unknown tree index {i}"))
                })?,
            }
        };

        Ok(TalentNode {
            id: self.id,
            node_type,
            max_ranks: self.max_ranks as u8,
            entries: self.entries,
            sub_tree_id: self.sub_tree_id,
            kind,
            order_index: self.order_index,
        })
    }
}
