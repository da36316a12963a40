//! Persistence orchestration: ties the AJAX client, the snapshot mirror
//! and the document store together.
//!
//! The service never mutates the document except through `dispatch`, and
//! the only state it keeps of its own is the readiness latch. Saves are
//! mirror-first: the local snapshot is written before the network call,
//! so a crash or rejection mid-save never loses the document.

use crate::client::{AjaxClient, SaveReceipt};
use crate::error::PersistError;
use crate::snapshot::{self, SnapshotStore};
use mk_core::model::MediaKitState;
use mk_core::schema;
use mk_editor::{Action, DocumentStore};
use serde_json::Value;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 100;

/// Lifecycle notifications for the embedding UI (toasts, status bar).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The document store holds the loaded document; editing may begin.
    Ready,
    /// A document arrived from the server.
    Loaded,
    Saved { components_count: usize },
    SaveFailed { message: String },
}

pub struct PersistService {
    client: AjaxClient,
    snapshots: Box<dyn SnapshotStore>,
    events: broadcast::Sender<EditorEvent>,
    post_id: u64,
    ready: bool,
}

impl PersistService {
    pub fn new(client: AjaxClient, snapshots: Box<dyn SnapshotStore>, post_id: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            snapshots,
            events,
            post_id,
            ready: false,
        }
    }

    /// Receiver for [`EditorEvent`]s emitted from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    /// Whether [`PersistService::initialize`] has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Swap in a fresh nonce after a heartbeat refresh.
    pub fn set_nonce(&mut self, nonce: impl Into<String>) {
        self.client.set_nonce(nonce);
    }

    /// Save the document. Mirrors locally first, then POSTs; a confirmed
    /// save marks the store clean at the revision that was sent and
    /// clears the mirror's primary snapshot. On failure the document and
    /// the mirror stay as they are and the error is returned for a
    /// manual retry.
    pub async fn save(&mut self, store: &mut DocumentStore) -> Result<SaveReceipt, PersistError> {
        let revision = store.revision();
        if let Err(err) = snapshot::mirror(self.snapshots.as_mut(), store.state()) {
            log::warn!("local mirror failed, continuing with the save: {err}");
        }

        match self.client.save_state(self.post_id, store.state()).await {
            Ok(receipt) => {
                store.mark_saved(revision);
                self.snapshots.remove(snapshot::SNAPSHOT_KEY);
                let _ = self.events.send(EditorEvent::Saved {
                    components_count: receipt.components_count,
                });
                Ok(receipt)
            }
            Err(err) => {
                let _ = self.events.send(EditorEvent::SaveFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Fetch a post's document. A post with nothing saved yet, or a blob
    /// that fails normalization, yields the default document.
    pub async fn load(&self, post_id: u64) -> Result<MediaKitState, PersistError> {
        let state = match self.client.load_state(post_id).await? {
            Some(blob) => self.adopt(blob),
            None => MediaKitState::default(),
        };
        let _ = self.events.send(EditorEvent::Loaded);
        Ok(state)
    }

    /// Bring the store up with the saved document and emit `Ready`
    /// exactly once. Pages that print the saved blob into the document
    /// at render time pass it as `injected` and skip the fetch.
    pub async fn initialize(
        &mut self,
        store: &mut DocumentStore,
        injected: Option<Value>,
    ) -> Result<(), PersistError> {
        if self.ready {
            log::warn!("persistence already initialized; ignoring");
            return Ok(());
        }

        let state = match injected {
            Some(blob) => self.adopt(blob),
            None => self.load(self.post_id).await?,
        };

        // SetState replaces wholesale and cannot be rejected.
        let _ = store.dispatch(Action::SetState {
            state: Box::new(state),
        });
        let revision = store.revision();
        store.mark_saved(revision);

        self.ready = true;
        let _ = self.events.send(EditorEvent::Ready);
        Ok(())
    }

    /// The most recent locally mirrored document, if any survives. Only
    /// meaningful while unsaved work exists; a confirmed save clears the
    /// primary snapshot, leaving the previous generation under the
    /// backup key.
    pub fn recover_backup(&self) -> Option<MediaKitState> {
        snapshot::recover(self.snapshots.as_ref())
    }

    fn adopt(&self, blob: Value) -> MediaKitState {
        match schema::from_wire(blob) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("saved document failed to parse, starting fresh: {err}");
                MediaKitState::default()
            }
        }
    }
}
