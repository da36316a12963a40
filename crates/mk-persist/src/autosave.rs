//! Debounced autosave scheduling.
//!
//! The store side publishes revisions into a watch channel after each
//! dispatch via [`note_dispatch`]; an [`Autosaver`] task awaits
//! [`Autosaver::settled`] and calls `PersistService::save` with whatever
//! the document looks like at fire time. Transient actions never bump
//! the revision, so they never wake the task, and the `auto_save` global
//! setting gates publishing at the source.

use mk_editor::DocumentStore;
use std::time::Duration;
use tokio::sync::watch;

/// Quiet window after the last state-changing dispatch.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1_000);

/// Publish the store's revision after a dispatch. Clean documents,
/// documents with autosave turned off, and dispatches that did not
/// change the revision wake nobody.
pub fn note_dispatch(revisions: &watch::Sender<u64>, store: &DocumentStore) {
    if !store.state().global_settings.auto_save || !store.is_dirty() {
        return;
    }
    let revision = store.revision();
    revisions.send_if_modified(|current| {
        if *current == revision {
            false
        } else {
            *current = revision;
            true
        }
    });
}

/// Receiver half of the autosave loop.
pub struct Autosaver {
    revisions: watch::Receiver<u64>,
    debounce: Duration,
}

impl Autosaver {
    pub fn new(revisions: watch::Receiver<u64>) -> Self {
        Self::with_debounce(revisions, AUTOSAVE_DEBOUNCE)
    }

    pub fn with_debounce(revisions: watch::Receiver<u64>, debounce: Duration) -> Self {
        Self {
            revisions,
            debounce,
        }
    }

    /// Wait for the next settled revision: resolves once the document
    /// has been quiet for the debounce window, with every fresh edit
    /// restarting the timer. A dropped sender flushes the last pending
    /// revision; `None` means the channel is exhausted.
    pub async fn settled(&mut self) -> Option<u64> {
        if self.revisions.changed().await.is_err() {
            return None;
        }
        loop {
            tokio::select! {
                () = tokio::time::sleep(self.debounce) => break,
                changed = self.revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        Some(*self.revisions.borrow_and_update())
    }
}
