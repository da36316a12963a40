//! The document store: single owner of editing state.
//!
//! All document mutations flow through [`DocumentStore::dispatch`], which
//! validates the action first and mutates only when it is legal, so a
//! rejected action never leaves the document half-changed. Accepted
//! actions record one undo snapshot, bump the revision counter and notify
//! subscribers synchronously, in registration order.
//!
//! The store is handed its dependencies (the component registry) at
//! construction; nothing here reads process-wide state.

use crate::actions::{Action, ActionError, MoveDirection, StatePatch, TargetPlacement};
use crate::history::CommandStack;
use crate::sections;
use crate::selection::EditorFlags;
use mk_core::id::ComponentId;
use mk_core::model::{Component, MediaKitState, PropMap};
use mk_core::registry::ComponentRegistry;
use std::sync::Arc;

/// Handle returned by [`DocumentStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&MediaKitState)>;

pub struct DocumentStore {
    registry: Arc<ComponentRegistry>,
    state: MediaKitState,
    flags: EditorFlags,
    history: CommandStack,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
    revision: u64,
    saved_revision: u64,
    /// A dispatch landed inside a batch; notify when the batch closes.
    pending_notify: bool,
}

impl DocumentStore {
    pub fn new(registry: impl Into<Arc<ComponentRegistry>>) -> Self {
        Self::with_state(registry, MediaKitState::default())
    }

    pub fn with_state(
        registry: impl Into<Arc<ComponentRegistry>>,
        state: MediaKitState,
    ) -> Self {
        Self {
            registry: registry.into(),
            state,
            flags: EditorFlags::default(),
            history: CommandStack::default(),
            subscribers: Vec::new(),
            next_subscriber: 1,
            revision: 0,
            saved_revision: 0,
            pending_notify: false,
        }
    }

    pub fn state(&self) -> &MediaKitState {
        &self.state
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Shared handle to the registry, for renderers and other layers that
    /// must see the same catalog as the store.
    pub fn registry_handle(&self) -> Arc<ComponentRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn flags(&self) -> &EditorFlags {
        &self.flags
    }

    /// Monotonic counter, bumped on every document change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the document changed since the last confirmed save.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Record that the document as of `revision` reached the server.
    /// Edits made while the save was in flight keep the store dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision > self.saved_revision {
            self.saved_revision = revision;
        }
    }

    // ─── Subscriptions ────────────────────────────────────────────────────

    /// Register a listener. It is invoked immediately with the current
    /// document, then again after every change.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&MediaKitState) + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        let mut callback: Subscriber = Box::new(callback);
        callback(&self.state);
        self.subscribers.push((id, callback));
        id
    }

    /// Returns true when the subscriber existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Inside a batch notifications are held back; the outermost
    /// `end_batch` delivers a single one for the whole group.
    fn notify(&mut self) {
        if self.history.is_batching() {
            self.pending_notify = true;
            return;
        }
        let Self {
            state, subscribers, ..
        } = self;
        for (_, callback) in subscribers.iter_mut() {
            callback(state);
        }
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────

    /// Apply an action. Rejected actions leave the document untouched;
    /// they are logged here and the error returned for callers that can
    /// do better than ignore it.
    pub fn dispatch(&mut self, action: Action) -> Result<(), ActionError> {
        if action.is_transient() {
            self.apply_transient(&action);
            self.notify();
            return Ok(());
        }

        if let Action::SetState { state } = action {
            self.state = *state;
            self.flags = EditorFlags::default();
            // Clearing history also abandons any open batch.
            self.history.clear();
            self.pending_notify = false;
            self.revision += 1;
            self.notify();
            return Ok(());
        }

        let description = action.describe();
        let before = self.state.clone();
        match self.reduce(action) {
            Ok(true) => {
                self.history.record(&before, &self.state, &description);
                self.revision += 1;
                self.notify();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                log::warn!("ignoring rejected action ({description}): {err}");
                Err(err)
            }
        }
    }

    fn apply_transient(&mut self, action: &Action) {
        match action {
            Action::Select { id } => {
                if self.state.components.contains_key(id) {
                    self.flags.selected = Some(*id);
                } else {
                    log::warn!("cannot select missing component '{id}'");
                }
            }
            Action::Deselect => self.flags.selected = None,
            Action::Hover { id } => self.flags.hovered = *id,
            Action::Focus { id } => self.flags.focused = *id,
            _ => {}
        }
    }

    /// Validate, then mutate. Returns whether the document changed.
    fn reduce(&mut self, action: Action) -> Result<bool, ActionError> {
        match action {
            Action::AddComponent {
                component,
                placement,
            } => self.reduce_add(component, placement),
            Action::UpdateComponent { id, props } => self.reduce_update(id, props),
            Action::SetComponentProps { id, props } => self.reduce_set_props(id, props),
            Action::RemoveComponent { id } => self.reduce_remove(id),
            Action::MoveComponent { id, direction } => self.reduce_move(id, direction),
            Action::DuplicateComponent { id } => self.reduce_duplicate(id),
            Action::SetLayout { order } => self.reduce_set_layout(order),

            Action::RegisterSection { id, kind } => sections::register(&mut self.state, id, kind),
            Action::UpdateSections { sections } => {
                sections::replace_all(&mut self.state, sections)
            }
            Action::UpdateSection {
                id,
                layout,
                options,
                responsive,
            } => sections::update(&mut self.state, id, layout, options, responsive),
            Action::RemoveSection { id } => sections::remove(&mut self.state, id),
            Action::ReorderSections { order } => sections::reorder(&mut self.state, order),
            Action::AssignToSection {
                component,
                section,
                column,
                index,
            } => sections::assign(&mut self.state, component, section, column, index),
            Action::UnassignFromSection { component } => {
                sections::unassign(&mut self.state, component)
            }

            Action::SetTheme { theme } => {
                if self.state.theme == theme {
                    return Ok(false);
                }
                self.state.theme = theme;
                Ok(true)
            }
            Action::SetThemeCustomizations { customizations } => {
                if self.state.theme_customizations == customizations {
                    return Ok(false);
                }
                self.state.theme_customizations = customizations;
                Ok(true)
            }
            Action::SetGlobalSettings { settings } => {
                if self.state.global_settings == settings {
                    return Ok(false);
                }
                self.state.global_settings = settings;
                Ok(true)
            }
            Action::MergeState { patch } => self.reduce_merge(*patch),
            Action::ClearState => {
                if self.state == MediaKitState::default() {
                    return Ok(false);
                }
                self.state = MediaKitState::default();
                self.flags = EditorFlags::default();
                Ok(true)
            }

            // Handled before reduce; listed so the match stays exhaustive.
            Action::SetState { .. }
            | Action::Select { .. }
            | Action::Deselect
            | Action::Hover { .. }
            | Action::Focus { .. } => Ok(false),
        }
    }

    fn reduce_add(
        &mut self,
        component: Component,
        placement: Option<TargetPlacement>,
    ) -> Result<bool, ActionError> {
        self.registry.validate_and_get(&component.kind)?;
        if self.state.components.contains_key(&component.id) {
            return Err(ActionError::DuplicateComponent(component.id));
        }
        if let Some(ref target) = placement {
            if self.state.section(target.section).is_none() {
                return Err(ActionError::MissingSection(target.section));
            }
        }

        let id = component.id;
        self.state.components.insert(id, component);
        self.state.layout.push(id);
        if let Some(target) = placement {
            if let Some(section) = self.state.section_mut(target.section) {
                section.place(id, target.column, target.index);
            }
        }
        Ok(true)
    }

    fn reduce_update(&mut self, id: ComponentId, props: PropMap) -> Result<bool, ActionError> {
        let component = self
            .state
            .components
            .get_mut(&id)
            .ok_or(ActionError::MissingComponent(id))?;
        for (key, value) in props {
            component.props.insert(key, value);
        }
        Ok(true)
    }

    fn reduce_set_props(&mut self, id: ComponentId, props: PropMap) -> Result<bool, ActionError> {
        let component = self
            .state
            .components
            .get_mut(&id)
            .ok_or(ActionError::MissingComponent(id))?;
        if component.props == props {
            return Ok(false);
        }
        component.props = props;
        Ok(true)
    }

    fn reduce_remove(&mut self, id: ComponentId) -> Result<bool, ActionError> {
        if self.state.components.remove(&id).is_none() {
            return Err(ActionError::MissingComponent(id));
        }
        self.state.layout.retain(|c| *c != id);
        for section in &mut self.state.sections {
            section.remove_component(id);
        }
        self.flags.clear_component(id);
        Ok(true)
    }

    fn reduce_move(
        &mut self,
        id: ComponentId,
        direction: MoveDirection,
    ) -> Result<bool, ActionError> {
        if !self.state.components.contains_key(&id) {
            return Err(ActionError::MissingComponent(id));
        }
        let towards_start = matches!(direction, MoveDirection::Up);

        // Sectioned components move within their column; the rest swap in
        // the flat layout order. At a boundary the move is a legal no-op.
        if let Some((section_id, _)) = self.state.placement_of(id) {
            let section = self
                .state
                .section_mut(section_id)
                .ok_or(ActionError::MissingSection(section_id))?;
            return Ok(section.shift_within_column(id, towards_start));
        }

        let Some(pos) = self.state.layout_position(id) else {
            return Err(ActionError::MissingComponent(id));
        };
        if towards_start {
            if pos == 0 {
                return Ok(false);
            }
            self.state.layout.swap(pos, pos - 1);
        } else {
            if pos + 1 >= self.state.layout.len() {
                return Ok(false);
            }
            self.state.layout.swap(pos, pos + 1);
        }
        Ok(true)
    }

    fn reduce_duplicate(&mut self, id: ComponentId) -> Result<bool, ActionError> {
        let source = self
            .state
            .components
            .get(&id)
            .ok_or(ActionError::MissingComponent(id))?
            .clone();

        // Generated IDs can collide with IDs from a loaded document.
        let mut dup_id = ComponentId::generate(&source.kind);
        while self.state.components.contains_key(&dup_id) {
            dup_id = ComponentId::generate(&source.kind);
        }
        let duplicate = Component {
            id: dup_id,
            kind: source.kind.clone(),
            props: source.props.clone(),
        };

        let at = self
            .state
            .layout_position(id)
            .map(|pos| pos + 1)
            .unwrap_or(self.state.layout.len());
        self.state.layout.insert(at, dup_id);
        self.state.components.insert(dup_id, duplicate);

        if let Some((section_id, column)) = self.state.placement_of(id) {
            if let Some(section) = self.state.section_mut(section_id) {
                let index = section
                    .column_components(column)
                    .iter()
                    .position(|c| *c == id)
                    .map(|i| i + 1);
                section.place(dup_id, column, index);
            }
        }
        Ok(true)
    }

    fn reduce_set_layout(&mut self, order: Vec<ComponentId>) -> Result<bool, ActionError> {
        check_layout_permutation(&self.state, &order)?;
        if self.state.layout == order {
            return Ok(false);
        }
        self.state.layout = order;
        Ok(true)
    }

    fn reduce_merge(&mut self, patch: StatePatch) -> Result<bool, ActionError> {
        if patch.is_empty() {
            return Ok(false);
        }
        // Build the merged document aside and validate it there, so a
        // rejected patch leaves the current document untouched.
        let mut merged = self.state.clone();
        if let Some(components) = patch.components {
            for (id, mut component) in components {
                component.id = id;
                if merged.components.insert(id, component).is_none() {
                    merged.layout.push(id);
                }
            }
        }
        if let Some(order) = patch.layout {
            check_layout_permutation(&merged, &order)?;
            merged.layout = order;
        }
        if let Some(new_sections) = patch.sections {
            sections::replace_all(&mut merged, new_sections)?;
        }
        if let Some(theme) = patch.theme {
            merged.theme = theme;
        }
        if let Some(customizations) = patch.theme_customizations {
            merged.theme_customizations = customizations;
        }
        if let Some(settings) = patch.global_settings {
            merged.global_settings = settings;
        }

        if merged == self.state {
            return Ok(false);
        }
        self.state = merged;
        Ok(true)
    }

    // ─── Convenience entry points ────────────────────────────────────────

    /// Create and add a component of `kind`: registry defaults first,
    /// `props` merged on top. Returns the new component's ID.
    pub fn add_component(
        &mut self,
        kind: &str,
        props: PropMap,
        placement: Option<TargetPlacement>,
    ) -> Result<ComponentId, ActionError> {
        let merged = {
            let definition = self.registry.validate_and_get(kind)?;
            let mut merged = definition.default_props.clone();
            for (key, value) in props {
                merged.insert(key, value);
            }
            merged
        };
        let component = Component::new(kind).with_props(merged);
        let id = component.id;
        self.dispatch(Action::AddComponent {
            component,
            placement,
        })?;
        Ok(id)
    }

    pub fn select_component(&mut self, id: ComponentId) {
        let _ = self.dispatch(Action::Select { id });
    }

    pub fn deselect(&mut self) {
        let _ = self.dispatch(Action::Deselect);
    }

    // ─── History ──────────────────────────────────────────────────────────

    /// Revert the last step. Returns its description.
    pub fn undo(&mut self) -> Option<String> {
        let (restored, description) = self.history.undo()?;
        self.state = restored;
        self.sweep_flags();
        self.revision += 1;
        self.notify();
        log::debug!("undo: {description}");
        Some(description)
    }

    /// Re-apply the last undone step. Returns its description.
    pub fn redo(&mut self) -> Option<String> {
        let (restored, description) = self.history.redo()?;
        self.state = restored;
        self.sweep_flags();
        self.revision += 1;
        self.notify();
        log::debug!("redo: {description}");
        Some(description)
    }

    /// A restored document may lack components the flags point at.
    fn sweep_flags(&mut self) {
        let state = &self.state;
        self.flags.retain(|id| state.components.contains_key(&id));
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// Group subsequent dispatches into one undo step. Subscribers stay
    /// quiet until the outermost batch closes.
    pub fn begin_batch(&mut self) {
        self.history.begin_batch(&self.state);
    }

    pub fn end_batch(&mut self, description: &str) {
        self.history.end_batch(&self.state, description);
        if !self.history.is_batching() && std::mem::take(&mut self.pending_notify) {
            self.notify();
        }
    }
}

fn check_layout_permutation(
    state: &MediaKitState,
    order: &[ComponentId],
) -> Result<(), ActionError> {
    if order.len() != state.components.len() {
        return Err(ActionError::InvalidLayoutOrder);
    }
    let mut seen = std::collections::BTreeSet::new();
    for id in order {
        if !state.components.contains_key(id) || !seen.insert(*id) {
            return Err(ActionError::InvalidLayoutOrder);
        }
    }
    Ok(())
}
