//! Hover-control mapping.
//!
//! The rendered markup gives every component and section a small control
//! toolbar whose buttons carry a `data-action` attribute. This module
//! resolves those attribute values into semantic buttons, and buttons
//! into dispatchable [`Action`]s. Buttons that open UI (the edit panel,
//! the section settings panel, the component library) resolve to a
//! button but not to an action; the shell handles them.

use crate::actions::{Action, MoveDirection};
use mk_core::id::{ComponentId, SectionId};

/// Buttons that can appear in a component or section control toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    // ── Component controls ──
    MoveUp,
    MoveDown,
    Edit,
    Duplicate,
    Delete,

    // ── Section controls ──
    SectionSettings,
    DeleteSection,

    // ── Empty state ──
    AddComponent,
}

impl ControlButton {
    /// Resolve a `data-action` attribute value. Returns `None` for
    /// attribute values no toolbar emits.
    pub fn resolve(data_action: &str) -> Option<Self> {
        match data_action {
            "move-up" => Some(Self::MoveUp),
            "move-down" => Some(Self::MoveDown),
            "edit" => Some(Self::Edit),
            "duplicate" => Some(Self::Duplicate),
            "delete" => Some(Self::Delete),
            "settings" => Some(Self::SectionSettings),
            "delete-section" => Some(Self::DeleteSection),
            "add-component" => Some(Self::AddComponent),
            _ => None,
        }
    }

    /// The `data-action` value the renderer emits for this button.
    pub fn data_action(&self) -> &'static str {
        match self {
            Self::MoveUp => "move-up",
            Self::MoveDown => "move-down",
            Self::Edit => "edit",
            Self::Duplicate => "duplicate",
            Self::Delete => "delete",
            Self::SectionSettings => "settings",
            Self::DeleteSection => "delete-section",
            Self::AddComponent => "add-component",
        }
    }

    /// The action a click dispatches when the button sits on a component.
    /// `None` means the button opens UI instead of mutating the document.
    pub fn action_for_component(&self, id: ComponentId) -> Option<Action> {
        match self {
            Self::MoveUp => Some(Action::MoveComponent {
                id,
                direction: MoveDirection::Up,
            }),
            Self::MoveDown => Some(Action::MoveComponent {
                id,
                direction: MoveDirection::Down,
            }),
            Self::Duplicate => Some(Action::DuplicateComponent { id }),
            Self::Delete => Some(Action::RemoveComponent { id }),
            Self::Edit | Self::SectionSettings | Self::DeleteSection | Self::AddComponent => None,
        }
    }

    /// The action a click dispatches when the button sits on a section.
    pub fn action_for_section(&self, id: SectionId) -> Option<Action> {
        match self {
            Self::DeleteSection => Some(Action::RemoveSection { id }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [ControlButton; 8] = [
        ControlButton::MoveUp,
        ControlButton::MoveDown,
        ControlButton::Edit,
        ControlButton::Duplicate,
        ControlButton::Delete,
        ControlButton::SectionSettings,
        ControlButton::DeleteSection,
        ControlButton::AddComponent,
    ];

    #[test]
    fn every_button_roundtrips_through_its_attribute() {
        for button in ALL {
            assert_eq!(ControlButton::resolve(button.data_action()), Some(button));
        }
    }

    #[test]
    fn unknown_attributes_resolve_to_nothing() {
        assert_eq!(ControlButton::resolve(""), None);
        assert_eq!(ControlButton::resolve("explode"), None);
        assert_eq!(ControlButton::resolve("move_up"), None);
        assert_eq!(ControlButton::resolve("Edit"), None);
    }

    #[test]
    fn component_buttons_map_to_actions() {
        let id = ComponentId::intern("hero-7");
        assert_eq!(
            ControlButton::MoveUp.action_for_component(id),
            Some(Action::MoveComponent {
                id,
                direction: MoveDirection::Up
            })
        );
        assert_eq!(
            ControlButton::MoveDown.action_for_component(id),
            Some(Action::MoveComponent {
                id,
                direction: MoveDirection::Down
            })
        );
        assert_eq!(
            ControlButton::Duplicate.action_for_component(id),
            Some(Action::DuplicateComponent { id })
        );
        assert_eq!(
            ControlButton::Delete.action_for_component(id),
            Some(Action::RemoveComponent { id })
        );
    }

    #[test]
    fn ui_buttons_dispatch_nothing() {
        let id = ComponentId::intern("hero-7");
        assert_eq!(ControlButton::Edit.action_for_component(id), None);
        assert_eq!(ControlButton::AddComponent.action_for_component(id), None);

        let section = SectionId::intern("s-1");
        assert_eq!(
            ControlButton::SectionSettings.action_for_section(section),
            None
        );
    }

    #[test]
    fn section_delete_maps_to_remove_section() {
        let id = SectionId::intern("s-1");
        assert_eq!(
            ControlButton::DeleteSection.action_for_section(id),
            Some(Action::RemoveSection { id })
        );
        assert_eq!(ControlButton::Delete.action_for_section(id), None);
    }
}
