//! Mutation engine: the single writer of a tree's selection state.
//!
//! Every operation either commits a complete new [`SelectionState`] or leaves
//! the current one untouched. Auto-adding prerequisites and cascading
//! removal are the two closure walks from [`crate::tree::closure`].
//!
//! Per-node transitions driven by [`TalentEngine::toggle`]:
//!
//! ```text
//! unselected ──select (+ missing ancestors)──▶ rank 1 / choice A
//! rank n < max ──increment (budget permitting)──▶ rank n+1
//! rank max, single rank ──▶ cascade deselect
//! choice A ──flip──▶ choice B ──▶ cascade deselect
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::budget::{would_exceed_point_limit, would_exceed_point_limit_with_prereqs};
use crate::selection::{PointsSpent, Selection, SelectionState};
use crate::tree::{TalentTree, TreeKind, dependent_closure, prerequisite_closure};

/// How long a rejected node stays flagged by default.
pub const DEFAULT_BLOCKED_FLASH: Duration = Duration::from_millis(400);

/// Result of a mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// State changed.
    Applied,
    /// Mutation was illegal; state unchanged.
    Rejected(RejectReason),
    /// Nothing to do (e.g. decrementing an unselected node).
    Ignored,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownNode(u32),
    PointLimit(TreeKind),
    /// Hero node outside the active sub-tree (carries the node's sub-tree).
    InactiveSubTree(u32),
}

/// Display state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Locked,
    Unlocked,
    Active,
    Maxed,
}

/// Display state of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Locked,
    Unlocked,
    Active,
}

/// What selecting a hovered node would pull in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathHighlight {
    pub target: Option<u32>,
    /// Unselected ancestors that would be auto-selected.
    pub missing: BTreeSet<u32>,
    /// Edges inside the target's prerequisite closure.
    pub edge_ids: BTreeSet<u32>,
}

#[derive(Debug, Clone, Copy)]
struct BlockedNode {
    node_id: u32,
    at: Instant,
}

/// Selection engine for one loaded tree.
#[derive(Debug, Clone)]
pub struct TalentEngine {
    tree: TalentTree,
    state: SelectionState,
    active_sub_tree: Option<u32>,
    painting: bool,
    paint_last: Option<u32>,
    /// Last node touched outside a drag; lets hovering chain selections too.
    hover_chain: Option<u32>,
    blocked: Option<BlockedNode>,
    blocked_flash: Duration,
}

impl TalentEngine {
    pub fn new(tree: TalentTree) -> Self {
        Self {
            tree,
            state: SelectionState::new(),
            active_sub_tree: None,
            painting: false,
            paint_last: None,
            hover_chain: None,
            blocked: None,
            blocked_flash: DEFAULT_BLOCKED_FLASH,
        }
    }

    pub fn with_blocked_flash(mut self, flash: Duration) -> Self {
        self.blocked_flash = flash;
        self
    }

    pub fn tree(&self) -> &TalentTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state
    }

    pub fn spent(&self) -> &PointsSpent {
        self.state.spent()
    }

    pub fn active_sub_tree(&self) -> Option<u32> {
        self.active_sub_tree
    }

    /// Switch the active hero sub-tree. Selections in any other sub-tree are
    /// cascade-removed so only one sub-tree ever holds points.
    pub fn set_active_sub_tree(&mut self, sub_tree_id: Option<u32>) -> MutationOutcome {
        if sub_tree_id == self.active_sub_tree {
            return MutationOutcome::Ignored;
        }

        let index = self.tree.edge_index();
        let mut next = self.state.clone();
        for (id, _) in self.state.iter() {
            let foreign = self
                .tree
                .node(id)
                .is_some_and(|n| n.is_hero() && Some(n.sub_tree_id) != sub_tree_id);
            if foreign {
                for dependent in dependent_closure(id, index) {
                    next.remove(dependent);
                }
            }
        }

        if next.len() != self.state.len() {
            self.commit(next);
            self.hover_chain = None;
        }
        self.active_sub_tree = sub_tree_id;
        MutationOutcome::Applied
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }

    /// Select, rank up, flip choice, or cascade-deselect `node_id`.
    pub fn toggle(&mut self, node_id: u32) -> MutationOutcome {
        let Some(node) = self.tree.node(node_id) else {
            return self.reject(node_id, RejectReason::UnknownNode(node_id));
        };
        let Some(current) = self.state.get(node_id).copied() else {
            return self.select_with_prereqs(node_id);
        };

        if node.is_choice() {
            if current.choice_index.unwrap_or(0) == 0 {
                let mut next = self.state.clone();
                next.set(
                    node_id,
                    Selection {
                        choice_index: Some(1),
                        ..current
                    },
                );
                self.commit(next);
                self.hover_chain = Some(node_id);
                return MutationOutcome::Applied;
            }
            return self.deselect(node_id);
        }

        if node.max_ranks > 1 && current.ranks_purchased < node.max_ranks {
            let limits = self.tree.point_limits();
            if let Some(kind) = would_exceed_point_limit(node, 1, self.state.spent(), limits) {
                return self.reject(node_id, RejectReason::PointLimit(kind));
            }
            let mut next = self.state.clone();
            next.set(
                node_id,
                Selection {
                    ranks_purchased: current.ranks_purchased + 1,
                    ..current
                },
            );
            self.commit(next);
            self.hover_chain = Some(node_id);
            return MutationOutcome::Applied;
        }

        self.deselect(node_id)
    }

    /// Drop one rank, or cascade-deselect when at rank 1 / single rank.
    pub fn decrement(&mut self, node_id: u32) -> MutationOutcome {
        let Some(node) = self.tree.node(node_id) else {
            return self.reject(node_id, RejectReason::UnknownNode(node_id));
        };
        let max_ranks = node.max_ranks;
        let Some(current) = self.state.get(node_id).copied() else {
            return MutationOutcome::Ignored;
        };

        if max_ranks > 1 && current.ranks_purchased > 1 {
            let mut next = self.state.clone();
            next.set(
                node_id,
                Selection {
                    ranks_purchased: current.ranks_purchased - 1,
                    ..current
                },
            );
            self.commit(next);
            return MutationOutcome::Applied;
        }

        self.deselect(node_id)
    }

    /// Begin a drag gesture anchored at `node_id`.
    pub fn start_paint(&mut self, node_id: u32) {
        self.painting = true;
        self.paint_last = Some(node_id);
    }

    /// Pointer entered `node_id`. Outside a drag this chains from the last
    /// node touched by a toggle or hover.
    pub fn paint_enter(&mut self, node_id: u32) -> MutationOutcome {
        let last = if self.painting {
            self.paint_last
        } else {
            self.hover_chain
        };
        let Some(last) = last else {
            return MutationOutcome::Ignored;
        };
        if last == node_id || !self.tree.edge_index().are_neighbors(last, node_id) {
            return MutationOutcome::Ignored;
        }

        if self.state.is_selected(node_id) {
            self.advance_cursor(node_id);
            return MutationOutcome::Ignored;
        }

        if self.tree.node(node_id).is_none() {
            return self.reject(node_id, RejectReason::UnknownNode(node_id));
        }
        let outcome = self.select_with_prereqs(node_id);
        if outcome.is_applied() {
            self.advance_cursor(node_id);
        } else {
            tracing::trace!("Paint step onto {} rejected: {:?}", node_id, outcome);
        }
        outcome
    }

    /// End the drag gesture. Already-applied steps stay applied.
    pub fn stop_paint(&mut self) {
        self.painting = false;
        self.paint_last = None;
    }

    /// Pointer hover changed; hovering a selected node moves the chain cursor.
    pub fn hover(&mut self, node_id: Option<u32>) {
        if let Some(id) = node_id
            && self.state.is_selected(id)
        {
            self.hover_chain = Some(id);
        }
    }

    /// Clear every selection.
    pub fn reset(&mut self) -> MutationOutcome {
        self.painting = false;
        self.paint_last = None;
        self.hover_chain = None;
        if self.state.is_empty() {
            return MutationOutcome::Ignored;
        }
        let mut next = self.state.clone();
        next.clear();
        self.commit(next);
        MutationOutcome::Applied
    }

    /// Replace the live state wholesale (undo/redo).
    pub fn restore(&mut self, mut selection: SelectionState, active_sub_tree: Option<u32>) {
        selection.refresh(&self.tree);
        self.state = selection;
        self.active_sub_tree = active_sub_tree;
        self.painting = false;
        self.paint_last = None;
        self.hover_chain = None;
    }

    /// Replace the live state with an externally produced selection (e.g. a
    /// decoded loadout), deriving the active sub-tree from it.
    pub fn load_selection(&mut self, selection: SelectionState) {
        let active = derive_active_sub_tree(&self.tree, &selection).or(self.active_sub_tree);
        self.restore(selection, active);
    }

    /// Last rejected node, while its flash is still running.
    pub fn blocked_node(&self) -> Option<u32> {
        self.blocked_node_at(Instant::now())
    }

    pub fn blocked_node_at(&self, now: Instant) -> Option<u32> {
        let blocked = self.blocked?;
        (now.saturating_duration_since(blocked.at) < self.blocked_flash).then_some(blocked.node_id)
    }

    pub fn node_state(&self, node_id: u32) -> Option<NodeState> {
        let node = self.tree.node(node_id)?;
        let ranks = self.state.ranks(node_id);
        if ranks >= node.max_ranks {
            return Some(NodeState::Maxed);
        }
        if ranks > 0 {
            return Some(NodeState::Active);
        }
        let parents = self.tree.edge_index().parents(node_id);
        if parents.iter().all(|&p| self.state.is_selected(p)) {
            Some(NodeState::Unlocked)
        } else {
            Some(NodeState::Locked)
        }
    }

    pub fn edge_state(&self, from: u32, to: u32) -> EdgeState {
        match (self.state.is_selected(from), self.state.is_selected(to)) {
            (true, true) => EdgeState::Active,
            (true, false) => EdgeState::Unlocked,
            _ => EdgeState::Locked,
        }
    }

    /// Preview of the prerequisite chain for an unselected node.
    pub fn path_highlight(&self, node_id: u32) -> PathHighlight {
        if self.state.is_selected(node_id) || self.tree.node(node_id).is_none() {
            return PathHighlight::default();
        }

        let index = self.tree.edge_index();
        let prereqs = prerequisite_closure(node_id, index);
        let missing = prereqs
            .iter()
            .copied()
            .filter(|&id| id != node_id && !self.state.is_selected(id))
            .collect();

        let mut edge_ids = BTreeSet::new();
        for &child in &prereqs {
            for &parent in index.parents(child) {
                if !prereqs.contains(&parent) {
                    continue;
                }
                if let Some(edge_id) = index.edge_id(parent, child) {
                    edge_ids.insert(edge_id);
                }
            }
        }

        PathHighlight {
            target: Some(node_id),
            missing,
            edge_ids,
        }
    }

    /// Main-tree nodes plus the nodes of the active sub-tree.
    pub fn display_node_ids(&self) -> BTreeSet<u32> {
        self.tree
            .visible_nodes()
            .filter(|n| !n.is_hero() || Some(n.sub_tree_id) == self.active_sub_tree)
            .map(|n| n.id)
            .collect()
    }

    fn select_with_prereqs(&mut self, node_id: u32) -> MutationOutcome {
        if let Some(node) = self.tree.node(node_id)
            && node.is_hero()
            && self.active_sub_tree.is_some_and(|active| active != node.sub_tree_id)
        {
            let sub_tree = node.sub_tree_id;
            return self.reject(node_id, RejectReason::InactiveSubTree(sub_tree));
        }

        let over = would_exceed_point_limit_with_prereqs(
            node_id,
            &self.tree,
            &self.state,
            self.state.spent(),
            self.tree.point_limits(),
        );
        if let Some(kind) = over {
            return self.reject(node_id, RejectReason::PointLimit(kind));
        }

        let mut next = self.state.clone();
        for id in prerequisite_closure(node_id, self.tree.edge_index()) {
            if next.is_selected(id) {
                continue;
            }
            match self.tree.node(id) {
                Some(node) => next.set(id, node.default_selection()),
                None => tracing::error!("Prerequisite {} of {} missing from tree", id, node_id),
            }
        }

        let sub_tree = self
            .tree
            .node(node_id)
            .map(|n| n.sub_tree_id)
            .filter(|&id| id > 0);
        self.commit(next);
        if sub_tree.is_some() {
            self.active_sub_tree = sub_tree;
        }
        self.hover_chain = Some(node_id);
        MutationOutcome::Applied
    }

    fn deselect(&mut self, node_id: u32) -> MutationOutcome {
        let mut next = self.state.clone();
        for id in dependent_closure(node_id, self.tree.edge_index()) {
            next.remove(id);
        }
        self.commit(next);
        self.hover_chain = None;
        MutationOutcome::Applied
    }

    fn commit(&mut self, mut next: SelectionState) {
        next.refresh(&self.tree);
        let spent = next.spent();
        tracing::debug!(
            "Committed selection: {} nodes (class {}, spec {}, hero {})",
            next.len(),
            spent.class,
            spent.spec,
            spent.hero
        );
        self.state = next;
    }

    fn reject(&mut self, node_id: u32, reason: RejectReason) -> MutationOutcome {
        tracing::debug!("Rejected mutation on node {}: {:?}", node_id, reason);
        self.blocked = Some(BlockedNode {
            node_id,
            at: Instant::now(),
        });
        MutationOutcome::Rejected(reason)
    }

    fn advance_cursor(&mut self, node_id: u32) {
        if self.painting {
            self.paint_last = Some(node_id);
        }
        self.hover_chain = Some(node_id);
    }
}

/// Sub-tree with the most points in `state`; ties go to the lowest id.
pub fn derive_active_sub_tree(tree: &TalentTree, state: &SelectionState) -> Option<u32> {
    let mut points: BTreeMap<u32, u32> = BTreeMap::new();
    for (id, selection) in state.iter() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        if node.is_hero() {
            *points.entry(node.sub_tree_id).or_default() += u32::from(selection.ranks_purchased);
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for (sub_tree, spent) in points {
        if best.is_none_or(|(_, top)| spent > top) {
            best = Some((sub_tree, spent));
        }
    }
    best.map(|(sub_tree, _)| sub_tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 -> 2 -> 3, plus hero nodes 10 -> 11 in sub-tree 7.
    fn engine() -> TalentEngine {
        let tree = TalentTree::from_json(
            r#"{
                "treeId": 1,
                "specId": 1,
                "nodes": [
                    { "id": 1, "entries": [{ "id": 100 }] },
                    { "id": 2, "entries": [{ "id": 200 }], "maxRanks": 2 },
                    { "id": 3, "entries": [{ "id": 300 }] },
                    { "id": 10, "entries": [{ "id": 1000 }], "subTreeId": 7 },
                    { "id": 11, "entries": [{ "id": 1100 }], "subTreeId": 7 }
                ],
                "edges": [
                    { "id": 50, "fromNodeId": 1, "toNodeId": 2 },
                    { "id": 51, "fromNodeId": 2, "toNodeId": 3 },
                    { "id": 52, "fromNodeId": 10, "toNodeId": 11 }
                ],
                "subTrees": [{ "id": 7, "name": "Templar" }]
            }"#,
        )
        .unwrap();
        TalentEngine::new(tree)
    }

    #[test]
    fn test_decrement_steps_down_then_cascades() {
        let mut e = engine();
        e.toggle(2);
        e.toggle(2);
        e.toggle(3);
        assert_eq!(e.selection().ranks(2), 2);

        assert_eq!(e.decrement(2), MutationOutcome::Applied);
        assert_eq!(e.selection().ranks(2), 1);
        assert!(e.selection().is_selected(3));

        assert_eq!(e.decrement(2), MutationOutcome::Applied);
        assert!(!e.selection().is_selected(2));
        assert!(!e.selection().is_selected(3));
        assert!(e.selection().is_selected(1));

        assert_eq!(e.decrement(2), MutationOutcome::Ignored);
    }

    #[test]
    fn test_unknown_node_is_rejected_and_flagged() {
        let mut e = engine();
        let before = Instant::now();
        assert_eq!(e.toggle(99), MutationOutcome::Rejected(RejectReason::UnknownNode(99)));
        assert_eq!(e.blocked_node_at(before), Some(99));
        assert_eq!(e.blocked_node_at(Instant::now() + Duration::from_secs(5)), None);
        assert!(e.selection().is_empty());
    }

    #[test]
    fn test_node_and_edge_states() {
        let mut e = engine();
        assert_eq!(e.node_state(1), Some(NodeState::Unlocked));
        assert_eq!(e.node_state(2), Some(NodeState::Locked));
        e.toggle(1);
        assert_eq!(e.node_state(1), Some(NodeState::Maxed));
        assert_eq!(e.node_state(2), Some(NodeState::Unlocked));
        assert_eq!(e.edge_state(1, 2), EdgeState::Unlocked);
        e.toggle(2);
        assert_eq!(e.node_state(2), Some(NodeState::Active));
        assert_eq!(e.edge_state(1, 2), EdgeState::Active);
        assert_eq!(e.edge_state(2, 3), EdgeState::Unlocked);
        assert_eq!(e.node_state(42), None);
    }

    #[test]
    fn test_path_highlight_lists_missing_prereqs() {
        let mut e = engine();
        e.toggle(1);
        let path = e.path_highlight(3);
        assert_eq!(path.target, Some(3));
        assert_eq!(path.missing, BTreeSet::from([2]));
        assert_eq!(path.edge_ids, BTreeSet::from([50, 51]));
        assert_eq!(e.path_highlight(1), PathHighlight::default());
    }

    #[test]
    fn test_hero_selection_activates_sub_tree() {
        let mut e = engine();
        assert!(!e.display_node_ids().contains(&10));
        e.toggle(11);
        assert_eq!(e.active_sub_tree(), Some(7));
        assert!(e.selection().is_selected(10));
        assert!(e.display_node_ids().contains(&10));
        assert_eq!(e.spent().hero, 2);
        assert_eq!(derive_active_sub_tree(e.tree(), e.selection()), Some(7));
    }

    #[test]
    fn test_other_sub_tree_requires_switching() {
        let tree = TalentTree::from_json(
            r#"{
                "treeId": 1,
                "specId": 1,
                "nodes": [
                    { "id": 1, "entries": [{ "id": 100 }] },
                    { "id": 10, "entries": [{ "id": 1000 }], "subTreeId": 7 },
                    { "id": 20, "entries": [{ "id": 2000 }], "subTreeId": 8 }
                ]
            }"#,
        )
        .unwrap();
        let mut e = TalentEngine::new(tree);
        e.toggle(1);
        e.toggle(10);
        assert_eq!(
            e.toggle(20),
            MutationOutcome::Rejected(RejectReason::InactiveSubTree(8))
        );
        assert_eq!(e.blocked_node(), Some(20));

        assert_eq!(e.set_active_sub_tree(Some(8)), MutationOutcome::Applied);
        assert!(!e.selection().is_selected(10));
        assert!(e.selection().is_selected(1));
        assert_eq!(e.spent().hero, 0);
        assert_eq!(e.toggle(20), MutationOutcome::Applied);
        assert_eq!(e.set_active_sub_tree(Some(8)), MutationOutcome::Ignored);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut e = engine();
        assert_eq!(e.reset(), MutationOutcome::Ignored);
        e.toggle(3);
        assert_eq!(e.reset(), MutationOutcome::Applied);
        assert!(e.selection().is_empty());
        assert_eq!(e.spent().total(), 0);
    }
}
