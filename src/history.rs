//! Bounded linear undo/redo log of immutable snapshots.

/// Default number of retained snapshots.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Snapshot log with a cursor. Entry 0 is the oldest retained snapshot; the
/// cursor points at the snapshot matching the live state.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Start a log whose first entry is `initial`. Capacity is at least 1.
    pub fn new(initial: T, capacity: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a committed state. Discards any redo branch and evicts the
    /// oldest entries past capacity.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walk() {
        let mut h = History::new(0, 10);
        h.push(1);
        h.push(2);
        assert_eq!(h.undo(), Some(&1));
        assert_eq!(h.undo(), Some(&0));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), Some(&1));
        assert_eq!(*h.current(), 1);
        assert!(h.can_redo());
    }

    #[test]
    fn test_push_after_undo_drops_redo_branch() {
        let mut h = History::new(0, 10);
        h.push(1);
        h.push(2);
        h.undo();
        h.push(3);
        assert!(!h.can_redo());
        assert_eq!(h.len(), 3);
        assert_eq!(h.undo(), Some(&1));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::new(0, 3);
        for i in 1..=10 {
            h.push(i);
            assert!(h.len() <= 3);
        }
        assert_eq!(h.undo(), Some(&9));
        assert_eq!(h.undo(), Some(&8));
        assert_eq!(h.undo(), None);
        assert_eq!(*h.current(), 8);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut h = History::new("a", 0);
        h.push("b");
        assert_eq!(h.len(), 1);
        assert_eq!(*h.current(), "b");
        assert!(!h.can_undo());
    }
}
