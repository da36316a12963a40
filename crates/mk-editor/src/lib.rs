//! mk-editor: editing state for the MK media-kit builder.
//!
//! The heart of the crate is [`DocumentStore`]: it owns the document,
//! validates and applies [`Action`]s, keeps the undo/redo stacks and
//! notifies subscribers after every change. Around it sit the section
//! API, the edit-panel controller and the hover-control mapping.

pub mod actions;
pub mod controls;
pub mod history;
pub mod panel;
pub mod sections;
pub mod selection;
pub mod store;

pub use actions::{Action, ActionError, MoveDirection, StatePatch, TargetPlacement};
pub use controls::ControlButton;
pub use history::{CommandStack, DEFAULT_MAX_DEPTH};
pub use panel::{EditPanel, PanelError};
pub use selection::EditorFlags;
pub use store::{DocumentStore, SubscriberId};
