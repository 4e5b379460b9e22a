//! Selection state (ranks purchased, chosen entries) and derived point totals.
//!
//! The per-node map is the source of truth. [`PointsSpent`] is cached on the
//! state but only ever produced by [`PointsSpent::compute`], and every writer
//! in the crate refreshes it before handing the state back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tree::{TalentTree, TreeKind};

/// Allocation of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub ranks_purchased: u8,
    /// Active entry for choice nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_index: Option<u8>,
}

impl Selection {
    pub fn selected(&self) -> bool {
        self.ranks_purchased > 0
    }
}

/// Points spent per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsSpent {
    pub class: u32,
    pub spec: u32,
    pub hero: u32,
}

impl PointsSpent {
    /// Sum purchased ranks per category over the tree's visible nodes.
    pub fn compute(tree: &TalentTree, nodes: &BTreeMap<u32, Selection>) -> Self {
        let mut spent = Self::default();
        for (&id, selection) in nodes {
            let Some(node) = tree.node(id) else {
                tracing::error!(
                    "Selection references node {} missing from tree {}",
                    id,
                    tree.tree_id
                );
                continue;
            };
            spent.add(node.kind, u32::from(selection.ranks_purchased));
        }
        spent
    }

    pub fn get(&self, kind: TreeKind) -> u32 {
        match kind {
            TreeKind::Class => self.class,
            TreeKind::Spec => self.spec,
            TreeKind::Hero => self.hero,
        }
    }

    pub fn add(&mut self, kind: TreeKind, points: u32) {
        match kind {
            TreeKind::Class => self.class += points,
            TreeKind::Spec => self.spec += points,
            TreeKind::Hero => self.hero += points,
        }
    }

    pub fn total(&self) -> u32 {
        self.class + self.spec + self.hero
    }
}

/// Node id → allocation, plus cached totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    nodes: BTreeMap<u32, Selection>,
    spent: PointsSpent,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from raw allocations. Unselected (zero-rank) entries and
    /// nodes the tree doesn't show are dropped.
    pub fn from_selections(
        tree: &TalentTree,
        selections: impl IntoIterator<Item = (u32, Selection)>,
    ) -> Self {
        let nodes = selections
            .into_iter()
            .filter(|(id, s)| s.selected() && tree.is_visible(*id))
            .collect();
        let mut state = Self {
            nodes,
            spent: PointsSpent::default(),
        };
        state.refresh(tree);
        state
    }

    pub fn get(&self, node_id: u32) -> Option<&Selection> {
        self.nodes.get(&node_id)
    }

    pub fn is_selected(&self, node_id: u32) -> bool {
        self.nodes.contains_key(&node_id)
    }

    pub fn ranks(&self, node_id: u32) -> u8 {
        self.nodes.get(&node_id).map_or(0, |s| s.ranks_purchased)
    }

    /// Selected nodes by ascending id.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Selection)> {
        self.nodes.iter().map(|(&id, s)| (id, s))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn spent(&self) -> &PointsSpent {
        &self.spent
    }

    pub(crate) fn set(&mut self, node_id: u32, selection: Selection) {
        if selection.selected() {
            self.nodes.insert(node_id, selection);
        } else {
            self.nodes.remove(&node_id);
        }
    }

    pub(crate) fn remove(&mut self, node_id: u32) -> Option<Selection> {
        self.nodes.remove(&node_id)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Recompute cached totals from the node map.
    pub(crate) fn refresh(&mut self, tree: &TalentTree) {
        self.spent = PointsSpent::compute(tree, &self.nodes);
    }
}
