//! Undo/Redo command stack.
//!
//! Every history entry is a **state snapshot pair**: the document before
//! and after a dispatched action. Undo swaps the current document for the
//! `before` snapshot in a single step; there is no per-mutation inverse
//! chain, so actions with generated IDs or placement side effects undo
//! exactly.
//!
//! Drag gestures and other compound edits use batching: the document is
//! captured once at `begin_batch` and once at `end_batch`, collapsing the
//! whole gesture into one undo step.

use mk_core::model::MediaKitState;

/// Default undo depth.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// One undoable step: full document snapshots on both sides of an action.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: MediaKitState,
    pub after: MediaKitState,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for compound gestures.
pub struct CommandStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Document captured at the start of a batch.
    batch_snapshot: Option<MediaKitState>,
    /// Whether any recording happened during the current batch.
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Record one applied action. Inside a batch the entry is absorbed:
    /// the snapshot at `end_batch` captures the cumulative effect.
    pub fn record(&mut self, before: &MediaKitState, after: &MediaKitState, description: &str) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        if before == after {
            return;
        }
        self.push(HistoryEntry {
            before: before.clone(),
            after: after.clone(),
            description: description.to_string(),
        });
    }

    /// Start a batch group. Captures the current document as the undo
    /// snapshot; everything recorded until `end_batch` becomes one step.
    pub fn begin_batch(&mut self, current: &MediaKitState) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(current.clone());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and anything
    /// actually changed, push one snapshot entry.
    pub fn end_batch(&mut self, current: &MediaKitState, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if self.batch_dirty {
                let before = self.batch_snapshot.take().unwrap_or_default();
                if before != *current {
                    self.push(HistoryEntry {
                        before,
                        after: current.clone(),
                        description: description.to_string(),
                    });
                }
            }
            self.batch_snapshot = None;
            self.batch_dirty = false;
        }
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action.
        self.redo_stack.clear();
    }

    /// Pop the last step. Returns the document to restore plus the step's
    /// description; the caller installs the state.
    pub fn undo(&mut self) -> Option<(MediaKitState, String)> {
        let entry = self.undo_stack.pop()?;
        let restored = entry.before.clone();
        let description = entry.description.clone();
        self.redo_stack.push(entry);
        Some((restored, description))
    }

    /// Re-apply the last undone step.
    pub fn redo(&mut self) -> Option<(MediaKitState, String)> {
        let entry = self.redo_stack.pop()?;
        let restored = entry.after.clone();
        let description = entry.description.clone();
        self.undo_stack.push(entry);
        Some((restored, description))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the step `undo` would revert, for menu items.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Drop all history, e.g. after replacing the document wholesale.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_snapshot = None;
        self.batch_dirty = false;
        self.batch_depth = 0;
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_core::id::ComponentId;
    use mk_core::model::Component;

    /// Distinct document states, one per appended component.
    fn state_with_n_components(n: usize) -> MediaKitState {
        let mut state = MediaKitState::default();
        for i in 0..n {
            let comp = Component::with_id(ComponentId::intern(&format!("c{i}")), "hero");
            state.layout.push(comp.id);
            state.components.insert(comp.id, comp);
        }
        state
    }

    #[test]
    fn undo_restores_the_before_state() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(0);
        let s1 = state_with_n_components(1);

        stack.record(&s0, &s1, "Add hero component");
        let (restored, desc) = stack.undo().expect("one undo step");
        assert_eq!(restored, s0);
        assert_eq!(desc, "Add hero component");
        assert!(stack.can_redo());

        let (redone, _) = stack.redo().expect("one redo step");
        assert_eq!(redone, s1);
    }

    #[test]
    fn redo_clears_on_new_action() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(0);
        let s1 = state_with_n_components(1);
        let s2 = state_with_n_components(2);

        stack.record(&s0, &s1, "first");
        stack.undo();
        assert!(stack.can_redo());

        stack.record(&s0, &s2, "second");
        assert!(!stack.can_redo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut stack = CommandStack::new(3);
        for i in 0..5 {
            stack.record(
                &state_with_n_components(i),
                &state_with_n_components(i + 1),
                "add",
            );
        }
        let mut undo_count = 0;
        while stack.undo().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
    }

    #[test]
    fn unchanged_state_records_nothing() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(1);
        stack.record(&s0, &s0.clone(), "noop");
        assert!(!stack.can_undo());
    }

    #[test]
    fn batch_collapses_to_single_step() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(0);

        stack.begin_batch(&s0);
        for i in 0..5 {
            stack.record(
                &state_with_n_components(i),
                &state_with_n_components(i + 1),
                "step",
            );
        }
        let s5 = state_with_n_components(5);
        stack.end_batch(&s5, "bulk add");

        assert_eq!(stack.depth(), 1);
        let (restored, desc) = stack.undo().unwrap();
        assert_eq!(restored, s0);
        assert_eq!(desc, "bulk add");
        assert!(!stack.can_undo());

        let (redone, _) = stack.redo().unwrap();
        assert_eq!(redone, s5);
    }

    #[test]
    fn nested_batches_close_at_outermost() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(0);
        let s1 = state_with_n_components(1);
        let s2 = state_with_n_components(2);

        stack.begin_batch(&s0);
        stack.begin_batch(&s0);
        stack.record(&s0, &s1, "inner");
        stack.end_batch(&s1, "inner done");
        assert!(stack.is_batching());
        assert_eq!(stack.depth(), 0);

        stack.record(&s1, &s2, "outer");
        stack.end_batch(&s2, "outer done");
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.undo_description(), Some("outer done"));
    }

    #[test]
    fn empty_batch_no_undo_entry() {
        let mut stack = CommandStack::new(10);
        let s0 = state_with_n_components(1);

        stack.begin_batch(&s0);
        stack.end_batch(&s0, "nothing happened");

        assert!(!stack.can_undo());
    }

    #[test]
    fn clear_drops_everything() {
        let mut stack = CommandStack::new(10);
        stack.record(
            &state_with_n_components(0),
            &state_with_n_components(1),
            "add",
        );
        stack.undo();
        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }
}
