// ============================================================================
// HISTORY — undo/redo stacks of full edit-state snapshots
// ============================================================================

use std::collections::VecDeque;

use crate::buffer::PixelBuffer;
use crate::state::{Adjustments, PipelineMode};

/// A deep, immutable copy of everything needed to restore an edit state.
///
/// `mode` travels with the snapshot so that undoing across an edge-detect
/// restores the frozen/live distinction along with the pixels.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Human-readable action description, e.g. "Rotate 90°".
    pub label: String,
    pub base: PixelBuffer,
    pub displayed: PixelBuffer,
    pub params: Adjustments,
    pub mode: PipelineMode,
}

impl Snapshot {
    pub fn memory_bytes(&self) -> usize {
        self.base.memory_bytes() + self.displayed.memory_bytes() + self.label.len()
    }
}

/// Undo/redo snapshot manager.
///
/// The top of the undo list is always the current committed state; the bottom
/// entry is the just-loaded image and acts as a floor that `undo` never pops
/// past. There is no pruning: the floor entry must stay reachable so undo
/// can always walk back to the loaded image.
#[derive(Default)]
pub struct HistoryStack {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a fresh snapshot. Anything that was undone can no longer be
    /// redone.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
    }

    /// Move the current state to the redo list and return the state to
    /// restore. `None` when only the floor entry remains.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop_back().unwrap();
        self.redo_stack.push_back(current);
        self.undo_stack.back()
    }

    /// Reapply the most recently undone state. `None` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let state = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(state);
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Called on image load and on full reset.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Action labels, most recent first.
    pub fn undo_history(&self) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .map(|s| s.label.as_str())
            .collect()
    }

    /// Total pixel bytes held across both stacks.
    pub fn memory_usage(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(Snapshot::memory_bytes)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Channels, PixelBuffer};

    fn snap(label: &str, fill: u8) -> Snapshot {
        let buf = PixelBuffer::from_raw(2, 2, Channels::Gray, vec![fill; 4]).unwrap();
        Snapshot {
            label: label.to_string(),
            base: buf.clone(),
            displayed: buf,
            params: Adjustments::default(),
            mode: PipelineMode::Live,
        }
    }

    #[test]
    fn undo_returns_previous_state_and_redo_reapplies() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        history.push(snap("Rotate 90°", 2));

        let restored = history.undo().expect("undo available");
        assert_eq!(restored.label, "Open");
        assert_eq!(restored.displayed.sample(0, 0, 0), 1);

        let redone = history.redo().expect("redo available");
        assert_eq!(redone.label, "Rotate 90°");
        assert_eq!(redone.displayed.sample(0, 0, 0), 2);
    }

    #[test]
    fn floor_entry_is_never_popped() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn fresh_push_clears_the_redo_list() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        history.push(snap("Flip", 2));
        history.undo().unwrap();
        assert!(history.can_redo());

        history.push(snap("Blur 3", 3));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        history.push(snap("Flip", 2));
        history.undo().unwrap();
        history.clear();
        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn memory_usage_tracks_both_stacks() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        history.push(snap("Flip", 2));
        let full = history.memory_usage();
        assert!(full > 0);
        history.undo().unwrap();
        // Moving an entry between stacks does not change the total.
        assert_eq!(history.memory_usage(), full);
    }

    #[test]
    fn labels_list_newest_first() {
        let mut history = HistoryStack::new();
        history.push(snap("Open", 1));
        history.push(snap("Flip", 2));
        assert_eq!(history.undo_history(), vec!["Flip", "Open"]);
    }
}
