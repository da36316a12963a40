//! Transient editor flags: selection, hover, focus.
//!
//! These live beside the document, not in it: they are never persisted,
//! never enter undo history, and survive re-renders because renders are
//! derived from state + flags rather than mutating either.

use mk_core::id::ComponentId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorFlags {
    pub selected: Option<ComponentId>,
    pub hovered: Option<ComponentId>,
    pub focused: Option<ComponentId>,
}

impl EditorFlags {
    pub fn is_selected(&self, id: ComponentId) -> bool {
        self.selected == Some(id)
    }

    pub fn is_hovered(&self, id: ComponentId) -> bool {
        self.hovered == Some(id)
    }

    /// Drop any flag pointing at a component that no longer exists.
    pub fn clear_component(&mut self, id: ComponentId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Keep only flags whose component still satisfies `exists`. Used after
    /// undo/redo, where the restored document may lack flagged components.
    pub fn retain(&mut self, exists: impl Fn(ComponentId) -> bool) {
        if self.selected.is_some_and(|id| !exists(id)) {
            self.selected = None;
        }
        if self.hovered.is_some_and(|id| !exists(id)) {
            self.hovered = None;
        }
        if self.focused.is_some_and(|id| !exists(id)) {
            self.focused = None;
        }
    }
}
