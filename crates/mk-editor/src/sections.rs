//! Section reducers and the section-facing store API.
//!
//! Sections own composition: a component is "in" a section exactly when
//! that section holds a placement for it. Assignment therefore always
//! removes the component from every other section first, so a component
//! can never appear in two places.

use crate::actions::{Action, ActionError};
use crate::store::DocumentStore;
use mk_core::id::{ComponentId, SectionId};
use mk_core::model::{
    merge_layout, LayoutPatch, MediaKitState, ResponsiveOverrides, Section, SectionKind,
    SectionLayout, SectionOptions,
};
use std::collections::BTreeSet;

// ─── Reducers ──────────────────────────────────────────────────────────────

pub(crate) fn register(
    state: &mut MediaKitState,
    id: SectionId,
    kind: SectionKind,
) -> Result<bool, ActionError> {
    if state.section(id).is_some() {
        return Err(ActionError::DuplicateSection(id));
    }
    state.sections.push(Section::new(id, kind));
    Ok(true)
}

pub(crate) fn update(
    state: &mut MediaKitState,
    id: SectionId,
    layout: Option<SectionLayout>,
    options: Option<SectionOptions>,
    responsive: Option<ResponsiveOverrides>,
) -> Result<bool, ActionError> {
    let section = state.section_mut(id).ok_or(ActionError::MissingSection(id))?;
    if layout.is_none() && options.is_none() && responsive.is_none() {
        return Ok(false);
    }
    if let Some(layout) = layout {
        section.layout = layout;
        // Columns may have shrunk; pull stranded placements back in range.
        let columns = section.column_count();
        for placement in &mut section.placements {
            placement.column = placement.column.clamp(1, columns);
        }
        section.renumber();
    }
    if let Some(options) = options {
        section.options = options;
    }
    if let Some(responsive) = responsive {
        section.responsive = responsive;
    }
    Ok(true)
}

/// Wholesale section-list replacement. Placements must reference existing
/// components, each component at most once across the whole list; columns
/// are clamped into range and orders renumbered densely.
pub(crate) fn replace_all(
    state: &mut MediaKitState,
    mut sections: Vec<Section>,
) -> Result<bool, ActionError> {
    let mut seen_sections = BTreeSet::new();
    let mut placed = BTreeSet::new();
    for section in &sections {
        if !seen_sections.insert(section.id) {
            return Err(ActionError::DuplicateSection(section.id));
        }
        for placement in &section.placements {
            if !state.components.contains_key(&placement.component) {
                return Err(ActionError::MissingComponent(placement.component));
            }
            if !placed.insert(placement.component) {
                return Err(ActionError::DuplicatePlacement(placement.component));
            }
        }
    }

    for section in &mut sections {
        let columns = section.column_count();
        for placement in &mut section.placements {
            placement.column = placement.column.clamp(1, columns);
        }
        section.renumber();
    }
    if state.sections == sections {
        return Ok(false);
    }
    state.sections = sections;
    Ok(true)
}

pub(crate) fn remove(state: &mut MediaKitState, id: SectionId) -> Result<bool, ActionError> {
    let Some(position) = state.section_position(id) else {
        return Err(ActionError::MissingSection(id));
    };
    // Components placed here stay in the document; they fall back to the
    // flat layout order until reassigned.
    state.sections.remove(position);
    Ok(true)
}

pub(crate) fn reorder(
    state: &mut MediaKitState,
    order: Vec<SectionId>,
) -> Result<bool, ActionError> {
    if order.len() != state.sections.len() {
        return Err(ActionError::InvalidSectionOrder);
    }
    let mut reordered = Vec::with_capacity(order.len());
    for id in &order {
        let Some(position) = state.sections.iter().position(|s| s.id == *id) else {
            return Err(ActionError::InvalidSectionOrder);
        };
        if reordered.iter().any(|s: &Section| s.id == *id) {
            return Err(ActionError::InvalidSectionOrder);
        }
        reordered.push(state.sections[position].clone());
    }
    if state.sections == reordered {
        return Ok(false);
    }
    state.sections = reordered;
    Ok(true)
}

pub(crate) fn assign(
    state: &mut MediaKitState,
    component: ComponentId,
    section: SectionId,
    column: u8,
    index: Option<usize>,
) -> Result<bool, ActionError> {
    if !state.components.contains_key(&component) {
        return Err(ActionError::MissingComponent(component));
    }
    if state.section(section).is_none() {
        return Err(ActionError::MissingSection(section));
    }
    for other in state.sections.iter_mut().filter(|s| s.id != section) {
        other.remove_component(component);
    }
    if let Some(target) = state.section_mut(section) {
        target.place(component, column, index);
    }
    Ok(true)
}

pub(crate) fn unassign(
    state: &mut MediaKitState,
    component: ComponentId,
) -> Result<bool, ActionError> {
    if !state.components.contains_key(&component) {
        return Err(ActionError::MissingComponent(component));
    }
    let mut removed = false;
    for section in &mut state.sections {
        removed |= section.remove_component(component);
    }
    Ok(removed)
}

// ─── Store facade ──────────────────────────────────────────────────────────

impl DocumentStore {
    /// Register a section under a caller-chosen ID. Returns a copy of the
    /// section as created, defaults applied.
    pub fn register_section(
        &mut self,
        id: SectionId,
        kind: SectionKind,
    ) -> Result<Section, ActionError> {
        self.dispatch(Action::RegisterSection { id, kind })?;
        Ok(self
            .state()
            .section(id)
            .cloned()
            .unwrap_or_else(|| Section::new(id, kind)))
    }

    /// Register a section with a generated ID.
    pub fn register_section_auto(&mut self, kind: SectionKind) -> Result<SectionId, ActionError> {
        let id = SectionId::generate();
        self.dispatch(Action::RegisterSection { id, kind })?;
        Ok(id)
    }

    /// Register a section and apply a layout patch on top of its defaults,
    /// as a single undo step.
    pub fn register_section_with(
        &mut self,
        id: SectionId,
        kind: SectionKind,
        patch: LayoutPatch,
    ) -> Result<Section, ActionError> {
        self.begin_batch();
        let result = self
            .register_section(id, kind)
            .and_then(|_| self.update_section_layout(id, patch));
        self.end_batch(&format!("Add {} section", kind.as_str()));
        result?;
        Ok(self
            .state()
            .section(id)
            .cloned()
            .unwrap_or_else(|| Section::new(id, kind)))
    }

    pub fn sections_in_order(&self) -> &[Section] {
        &self.state().sections
    }

    /// Merge a sparse layout patch into the section's current layout.
    pub fn update_section_layout(
        &mut self,
        id: SectionId,
        patch: LayoutPatch,
    ) -> Result<(), ActionError> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut layout = self
            .state()
            .section(id)
            .ok_or(ActionError::MissingSection(id))?
            .layout
            .clone();
        merge_layout(&mut layout, &patch);
        self.dispatch(Action::UpdateSection {
            id,
            layout: Some(layout),
            options: None,
            responsive: None,
        })
    }

    /// Update a section's layout and presentation options together, as one
    /// undo step. The layout patch is merged; options replace wholesale.
    pub fn update_section_configuration(
        &mut self,
        id: SectionId,
        patch: Option<LayoutPatch>,
        options: Option<SectionOptions>,
    ) -> Result<(), ActionError> {
        let layout = match patch {
            Some(patch) if !patch.is_empty() => {
                let mut layout = self
                    .state()
                    .section(id)
                    .ok_or(ActionError::MissingSection(id))?
                    .layout
                    .clone();
                merge_layout(&mut layout, &patch);
                Some(layout)
            }
            _ => None,
        };
        if layout.is_none() && options.is_none() {
            return Ok(());
        }
        self.dispatch(Action::UpdateSection {
            id,
            layout,
            options,
            responsive: None,
        })
    }

    pub fn assign_component_to_section(
        &mut self,
        component: ComponentId,
        section: SectionId,
        column: u8,
        index: Option<usize>,
    ) -> Result<(), ActionError> {
        self.dispatch(Action::AssignToSection {
            component,
            section,
            column,
            index,
        })
    }

    pub fn remove_component_from_section(
        &mut self,
        component: ComponentId,
    ) -> Result<(), ActionError> {
        self.dispatch(Action::UnassignFromSection { component })
    }

    pub fn remove_section(&mut self, id: SectionId) -> Result<(), ActionError> {
        self.dispatch(Action::RemoveSection { id })
    }

    pub fn reorder_sections(&mut self, order: Vec<SectionId>) -> Result<(), ActionError> {
        self.dispatch(Action::ReorderSections { order })
    }
}
