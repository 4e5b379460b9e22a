//! A loaded tree's engine plus its undo/redo history.
//!
//! Discrete mutations each record one snapshot. Steps of a paint drag (and
//! toggles made while a drag is active) are coalesced into a single snapshot
//! recorded when the drag ends.

use crate::config::CalcConfig;
use crate::engine::{MutationOutcome, TalentEngine};
use crate::history::History;
use crate::loadout::{self, DecodeError};
use crate::selection::{PointsSpent, SelectionState};
use crate::tree::{TalentTree, TreeKind};

/// Committed state as stored in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub selection: SelectionState,
    pub active_sub_tree: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Calculator {
    engine: TalentEngine,
    history: History<Snapshot>,
    paint_dirty: bool,
}

impl Calculator {
    pub fn new(tree: TalentTree, config: &CalcConfig) -> Self {
        let engine = TalentEngine::new(tree).with_blocked_flash(config.blocked_flash());
        let history = History::new(snapshot_of(&engine), config.history_depth);
        Self {
            engine,
            history,
            paint_dirty: false,
        }
    }

    /// Start from a shared loadout, or from an empty selection if it doesn't decode.
    pub fn with_loadout(tree: TalentTree, config: &CalcConfig, encoded: &str) -> Self {
        let mut calc = Self::new(tree, config);
        match loadout::decode(encoded, calc.engine.tree()) {
            Ok(selection) => {
                calc.engine.load_selection(selection);
                calc.history.reset(snapshot_of(&calc.engine));
            }
            Err(e) => tracing::warn!("Ignoring initial loadout: {}", e),
        }
        calc
    }

    pub fn engine(&self) -> &TalentEngine {
        &self.engine
    }

    pub fn tree(&self) -> &TalentTree {
        self.engine.tree()
    }

    pub fn selection(&self) -> &SelectionState {
        self.engine.selection()
    }

    pub fn spent(&self) -> &PointsSpent {
        self.engine.spent()
    }

    pub fn toggle(&mut self, node_id: u32) -> MutationOutcome {
        let outcome = self.engine.toggle(node_id);
        self.record_if(outcome);
        outcome
    }

    pub fn decrement(&mut self, node_id: u32) -> MutationOutcome {
        let outcome = self.engine.decrement(node_id);
        self.record_if(outcome);
        outcome
    }

    pub fn reset(&mut self) -> MutationOutcome {
        self.flush_paint();
        let outcome = self.engine.reset();
        self.record_if(outcome);
        outcome
    }

    pub fn start_paint(&mut self, node_id: u32) {
        self.flush_paint();
        self.engine.start_paint(node_id);
    }

    pub fn paint_enter(&mut self, node_id: u32) -> MutationOutcome {
        let outcome = self.engine.paint_enter(node_id);
        self.record_if(outcome);
        outcome
    }

    /// End the drag and record its steps as one history entry.
    pub fn stop_paint(&mut self) {
        self.flush_paint();
    }

    pub fn hover(&mut self, node_id: Option<u32>) {
        self.engine.hover(node_id);
    }

    /// Switch hero sub-trees. Recorded like any other mutation.
    pub fn set_active_sub_tree(&mut self, sub_tree_id: Option<u32>) -> MutationOutcome {
        let outcome = self.engine.set_active_sub_tree(sub_tree_id);
        self.record_if(outcome);
        outcome
    }

    pub fn undo(&mut self) -> bool {
        self.flush_paint();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        tracing::debug!("Undo to {} selected nodes", snapshot.selection.len());
        self.engine.restore(snapshot.selection, snapshot.active_sub_tree);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.flush_paint();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        tracing::debug!("Redo to {} selected nodes", snapshot.selection.len());
        self.engine.restore(snapshot.selection, snapshot.active_sub_tree);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current selection as a shareable string.
    pub fn export_loadout(&self) -> String {
        loadout::encode(self.selection(), self.tree().tree_id)
    }

    /// Replace the selection with a decoded loadout. On failure nothing changes.
    pub fn import_loadout(&mut self, input: &str) -> Result<(), DecodeError> {
        self.flush_paint();
        let selection = loadout::decode(input, self.tree()).inspect_err(|e| {
            tracing::warn!("Rejected loadout for tree {}: {}", self.tree().tree_id, e);
        })?;
        self.engine.load_selection(selection);
        self.record();
        Ok(())
    }

    /// One-line spend summary, e.g. `class 3/31  spec 0/30  hero 0/10`.
    pub fn summary(&self) -> String {
        let limits = self.tree().point_limits();
        TreeKind::ALL
            .iter()
            .map(|&kind| format!("{} {}/{}", kind, self.spent().get(kind), limits.get(kind)))
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn record_if(&mut self, outcome: MutationOutcome) {
        if !outcome.is_applied() {
            return;
        }
        if self.engine.is_painting() {
            self.paint_dirty = true;
        } else {
            self.record();
        }
    }

    fn flush_paint(&mut self) {
        self.engine.stop_paint();
        if self.paint_dirty {
            self.paint_dirty = false;
            self.record();
        }
    }

    fn record(&mut self) {
        self.history.push(snapshot_of(&self.engine));
    }
}

fn snapshot_of(engine: &TalentEngine) -> Snapshot {
    Snapshot {
        selection: engine.selection().clone(),
        active_sub_tree: engine.active_sub_tree(),
    }
}
