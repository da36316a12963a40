//! Editor actions: the single vocabulary of document mutations.
//!
//! Every change to a [`mk_core::MediaKitState`] is expressed as an
//! [`Action`] and dispatched through the store. Transient actions
//! (selection, hover, focus) touch only editor flags and never the
//! document, so they are excluded from history and autosave.

use mk_core::id::{ComponentId, SectionId};
use mk_core::model::{
    Component, GlobalSettings, MediaKitState, PropMap, ResponsiveOverrides, Section, SectionKind,
    SectionLayout, SectionOptions,
};
use mk_core::theme::ThemeCustomizations;
use mk_core::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Where a freshly added component should land.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPlacement {
    pub section: SectionId,
    pub column: u8,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Partial document for [`Action::MergeState`]: present groups are merged
/// in, absent groups keep their current value. Components are upserted by
/// ID; the other groups replace wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<BTreeMap<ComponentId, Component>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<ComponentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_customizations: Option<ThemeCustomizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_settings: Option<GlobalSettings>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self == &StatePatch::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert a component at the end of the layout, optionally placing it
    /// into a section column.
    AddComponent {
        component: Component,
        placement: Option<TargetPlacement>,
    },
    /// Shallow-merge `props` onto the component's existing props.
    UpdateComponent { id: ComponentId, props: PropMap },
    /// Replace the component's props wholesale.
    SetComponentProps { id: ComponentId, props: PropMap },
    RemoveComponent { id: ComponentId },
    /// Swap with the neighbor, within the owning column or the flat layout.
    MoveComponent {
        id: ComponentId,
        direction: MoveDirection,
    },
    /// Insert a copy (fresh ID, same props) right after the original.
    DuplicateComponent { id: ComponentId },
    /// Replace the flat ordering. `order` must be a permutation of the
    /// current component key set.
    SetLayout { order: Vec<ComponentId> },

    RegisterSection { id: SectionId, kind: SectionKind },
    /// Replace the whole section list. Every placement must reference an
    /// existing component, each component at most once across the list;
    /// a violating list is rejected as a unit. Columns are clamped into
    /// range and orders renumbered densely.
    UpdateSections { sections: Vec<Section> },
    /// Replace whole configuration groups of a section; `None` keeps the
    /// current value.
    UpdateSection {
        id: SectionId,
        layout: Option<SectionLayout>,
        options: Option<SectionOptions>,
        responsive: Option<ResponsiveOverrides>,
    },
    /// Drop the section; its components stay in the document, unsectioned.
    RemoveSection { id: SectionId },
    /// `order` must be a permutation of the current section IDs.
    ReorderSections { order: Vec<SectionId> },
    AssignToSection {
        component: ComponentId,
        section: SectionId,
        column: u8,
        index: Option<usize>,
    },
    UnassignFromSection { component: ComponentId },

    SetTheme { theme: String },
    SetThemeCustomizations { customizations: ThemeCustomizations },
    SetGlobalSettings { settings: GlobalSettings },
    /// Replace the whole document (load path). Clears undo history.
    SetState { state: Box<MediaKitState> },
    /// Merge a partial document on top of the current one. Unlike
    /// `SetState` this is an ordinary undoable dispatch.
    MergeState { patch: Box<StatePatch> },
    /// Reset the document to its defaults, undoably.
    ClearState,

    Select { id: ComponentId },
    Deselect,
    Hover { id: Option<ComponentId> },
    Focus { id: Option<ComponentId> },
}

impl Action {
    /// Transient actions update editor flags only: no history entry, no
    /// revision bump, no autosave.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Action::Select { .. } | Action::Deselect | Action::Hover { .. } | Action::Focus { .. }
        )
    }

    /// Human-readable label, used as the undo/redo description.
    pub fn describe(&self) -> String {
        match self {
            Action::AddComponent { component, .. } => {
                format!("Add {} component", component.kind)
            }
            Action::UpdateComponent { id, .. } => format!("Update component '{id}'"),
            Action::SetComponentProps { id, .. } => format!("Replace props of '{id}'"),
            Action::RemoveComponent { id } => format!("Remove component '{id}'"),
            Action::MoveComponent { id, direction } => match direction {
                MoveDirection::Up => format!("Move component '{id}' up"),
                MoveDirection::Down => format!("Move component '{id}' down"),
            },
            Action::DuplicateComponent { id } => format!("Duplicate component '{id}'"),
            Action::SetLayout { .. } => "Reorder components".to_string(),
            Action::UpdateSections { .. } => "Replace sections".to_string(),
            Action::RegisterSection { kind, .. } => {
                format!("Add {} section", kind.as_str())
            }
            Action::UpdateSection { id, .. } => format!("Update section '{id}'"),
            Action::RemoveSection { id } => format!("Remove section '{id}'"),
            Action::ReorderSections { .. } => "Reorder sections".to_string(),
            Action::AssignToSection {
                component, section, ..
            } => format!("Move component '{component}' to section '{section}'"),
            Action::UnassignFromSection { component } => {
                format!("Remove component '{component}' from its section")
            }
            Action::SetTheme { theme } => format!("Switch theme to {theme}"),
            Action::SetThemeCustomizations { .. } => "Customize theme".to_string(),
            Action::SetGlobalSettings { .. } => "Update global settings".to_string(),
            Action::SetState { .. } => "Replace document".to_string(),
            Action::MergeState { .. } => "Merge document changes".to_string(),
            Action::ClearState => "Clear document".to_string(),
            Action::Select { id } => format!("Select component '{id}'"),
            Action::Deselect => "Clear selection".to_string(),
            Action::Hover { .. } => "Hover".to_string(),
            Action::Focus { .. } => "Focus".to_string(),
        }
    }
}

/// Why a dispatched action was rejected. The store logs these and leaves
/// the document untouched; callers with no better recourse may ignore
/// them.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("component '{0}' not found")]
    MissingComponent(ComponentId),

    #[error("component '{0}' already exists")]
    DuplicateComponent(ComponentId),

    #[error("section '{0}' not found")]
    MissingSection(SectionId),

    #[error("section '{0}' already exists")]
    DuplicateSection(SectionId),

    #[error("section order must be a permutation of the existing sections")]
    InvalidSectionOrder,

    #[error("layout must be a permutation of the existing components")]
    InvalidLayoutOrder,

    #[error("component '{0}' is placed more than once")]
    DuplicatePlacement(ComponentId),
}
