//! Edit panel controller: field-by-field editing against a draft.
//!
//! The panel does not own the document; it drives a [`DocumentStore`]
//! passed into each call. Opening snapshots the component's props into a
//! draft, `set_field` edits the draft only, and `apply` commits it with a
//! single dispatch, so one apply is one undo step. Cancelling throws the
//! draft away without touching the document and clears the selection.

use crate::actions::Action;
use crate::store::DocumentStore;
use mk_core::id::ComponentId;
use mk_core::model::PropMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("no edit panel is open")]
    NotOpen,

    #[error("component '{0}' not found")]
    MissingComponent(ComponentId),

    #[error("'{0}' components have no design panel")]
    Unsupported(String),
}

/// Controller state for the component edit panel.
#[derive(Default)]
pub struct EditPanel {
    open_for: Option<ComponentId>,
    draft: PropMap,
}

impl EditPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open_for.is_some()
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.open_for
    }

    /// The working copy of the open component's props. Empty when closed.
    pub fn draft(&self) -> &PropMap {
        &self.draft
    }

    /// Open the panel for a component, selecting it and snapshotting its
    /// props into the draft. If another edit session is in progress its
    /// draft is applied first.
    pub fn open(&mut self, store: &mut DocumentStore, id: ComponentId) -> Result<(), PanelError> {
        let component = store
            .state()
            .components
            .get(&id)
            .ok_or(PanelError::MissingComponent(id))?;
        if let Some(definition) = store.registry().lookup(&component.kind) {
            if !definition.supports.design_panel {
                return Err(PanelError::Unsupported(component.kind.clone()));
            }
        }
        let draft = component.props.clone();

        if self.open_for.is_some() {
            // The previous component may have been deleted mid-session.
            let _ = self.apply(store);
        }
        store.select_component(id);
        self.open_for = Some(id);
        self.draft = draft;
        Ok(())
    }

    /// Write one field into the draft. The document is untouched until
    /// [`EditPanel::apply`].
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), PanelError> {
        if self.open_for.is_none() {
            return Err(PanelError::NotOpen);
        }
        self.draft.insert(key.to_string(), value);
        Ok(())
    }

    /// Commit the draft with a single `UpdateComponent` dispatch. The
    /// panel stays open and the draft re-snapshots from the document.
    pub fn apply(&mut self, store: &mut DocumentStore) -> Result<(), PanelError> {
        let id = self.open_for.ok_or(PanelError::NotOpen)?;
        store
            .dispatch(Action::UpdateComponent {
                id,
                props: self.draft.clone(),
            })
            .map_err(|_| PanelError::MissingComponent(id))?;
        self.draft = store
            .state()
            .components
            .get(&id)
            .map(|c| c.props.clone())
            .unwrap_or_default();
        Ok(())
    }

    /// Throw the draft away, deselect and close. The document never sees
    /// the discarded edits.
    pub fn cancel(&mut self, store: &mut DocumentStore) {
        if self.open_for.take().is_some() {
            self.draft = PropMap::new();
            store.deselect();
        }
    }
}
