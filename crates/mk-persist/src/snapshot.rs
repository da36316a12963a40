//! Local snapshot mirror: the crash-recovery copy kept beside the server.
//!
//! Before every save the current document is mirrored to a local
//! [`SnapshotStore`] under the same keys the classic builder used in
//! `localStorage`. The previous snapshot rotates to the backup key, and a
//! short journal of snapshot metadata is kept under the history key.
//! Snapshots are MessagePack blobs of `{ meta, state }`.

use crate::error::PersistError;
use mk_core::model::MediaKitState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SNAPSHOT_KEY: &str = "guestifyMediaKitState";
pub const BACKUP_KEY: &str = "guestifyMediaKitState_backup";
pub const HISTORY_KEY: &str = "guestifyMediaKitState_history";

/// Journal entries kept under [`HISTORY_KEY`].
pub const MAX_HISTORY: usize = 10;

const SNAPSHOT_VERSION: &str = "2.0.0";

/// Keyed blob storage for snapshots. The embedding decides where the
/// bytes live (browser storage, a sidecar file); tests and headless use
/// get [`MemorySnapshotStore`].
pub trait SnapshotStore: Send {
    fn put(&mut self, key: &str, bytes: Vec<u8>);
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn remove(&mut self, key: &str);
}

/// In-memory [`SnapshotStore`].
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn put(&mut self, key: &str, bytes: Vec<u8>) {
        self.entries.insert(key.to_string(), bytes);
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// What a snapshot records about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub version: String,
    /// Unix seconds at mirror time.
    pub saved_at: u64,
    pub components_count: usize,
    pub layout_len: usize,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    meta: &'a SnapshotMeta,
    state: &'a MediaKitState,
}

#[derive(Deserialize)]
struct Snapshot {
    #[allow(dead_code)]
    meta: SnapshotMeta,
    state: MediaKitState,
}

/// Encode one snapshot blob for the given document.
pub fn encode(state: &MediaKitState) -> Result<Vec<u8>, PersistError> {
    let meta = meta_for(state);
    encode_with_meta(&meta, state)
}

/// Decode a snapshot blob back into a document.
pub fn decode(bytes: &[u8]) -> Result<MediaKitState, PersistError> {
    let snapshot: Snapshot =
        rmp_serde::from_slice(bytes).map_err(|e| PersistError::Snapshot(e.to_string()))?;
    Ok(snapshot.state)
}

/// Mirror the document: rotate the current snapshot to the backup key,
/// write the new one, and append its metadata to the journal.
pub fn mirror(store: &mut dyn SnapshotStore, state: &MediaKitState) -> Result<(), PersistError> {
    if let Some(existing) = store.get(SNAPSHOT_KEY) {
        store.put(BACKUP_KEY, existing);
    }

    let meta = meta_for(state);
    let bytes = encode_with_meta(&meta, state)?;
    store.put(SNAPSHOT_KEY, bytes);

    let mut journal = history(&*store);
    journal.insert(0, meta);
    journal.truncate(MAX_HISTORY);
    let journal_bytes =
        rmp_serde::to_vec_named(&journal).map_err(|e| PersistError::Snapshot(e.to_string()))?;
    store.put(HISTORY_KEY, journal_bytes);
    Ok(())
}

/// Read back the most recent recoverable document: the primary snapshot,
/// or the backup when the primary is missing or unreadable.
pub fn recover(store: &dyn SnapshotStore) -> Option<MediaKitState> {
    for key in [SNAPSHOT_KEY, BACKUP_KEY] {
        if let Some(bytes) = store.get(key) {
            match decode(&bytes) {
                Ok(state) => return Some(state),
                Err(err) => log::warn!("snapshot under '{key}' is unreadable: {err}"),
            }
        }
    }
    None
}

/// The snapshot journal, newest first. Unreadable journals come back
/// empty rather than failing the caller.
pub fn history(store: &dyn SnapshotStore) -> Vec<SnapshotMeta> {
    let Some(bytes) = store.get(HISTORY_KEY) else {
        return Vec::new();
    };
    rmp_serde::from_slice(&bytes).unwrap_or_else(|err| {
        log::warn!("snapshot journal is unreadable: {err}");
        Vec::new()
    })
}

fn meta_for(state: &MediaKitState) -> SnapshotMeta {
    SnapshotMeta {
        version: SNAPSHOT_VERSION.to_string(),
        saved_at: unix_now(),
        components_count: state.components.len(),
        layout_len: state.layout.len(),
    }
}

fn encode_with_meta(meta: &SnapshotMeta, state: &MediaKitState) -> Result<Vec<u8>, PersistError> {
    rmp_serde::to_vec_named(&SnapshotRef { meta, state })
        .map_err(|e| PersistError::Snapshot(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_core::id::ComponentId;
    use mk_core::model::Component;
    use pretty_assertions::assert_eq;

    fn state_with(components: usize) -> MediaKitState {
        let mut state = MediaKitState::default();
        for n in 0..components {
            let id = ComponentId::intern(&format!("snap-{n}"));
            state.components.insert(id, Component::with_id(id, "hero"));
            state.layout.push(id);
        }
        state
    }

    #[test]
    fn round_trip_preserves_the_document() {
        let state = state_with(2);
        let bytes = encode(&state).unwrap();
        assert_eq!(decode(&bytes).unwrap(), state);
    }

    #[test]
    fn mirror_rotates_the_previous_snapshot_into_backup() {
        let mut store = MemorySnapshotStore::new();
        mirror(&mut store, &state_with(1)).unwrap();
        mirror(&mut store, &state_with(3)).unwrap();

        let primary = decode(&store.get(SNAPSHOT_KEY).unwrap()).unwrap();
        let backup = decode(&store.get(BACKUP_KEY).unwrap()).unwrap();
        assert_eq!(primary.components.len(), 3);
        assert_eq!(backup.components.len(), 1);
    }

    #[test]
    fn recover_prefers_primary_then_falls_back() {
        let mut store = MemorySnapshotStore::new();
        mirror(&mut store, &state_with(1)).unwrap();
        mirror(&mut store, &state_with(2)).unwrap();
        assert_eq!(recover(&store).unwrap().components.len(), 2);

        store.remove(SNAPSHOT_KEY);
        assert_eq!(recover(&store).unwrap().components.len(), 1);

        store.remove(BACKUP_KEY);
        assert!(recover(&store).is_none());
    }

    #[test]
    fn recover_skips_a_corrupt_primary() {
        let mut store = MemorySnapshotStore::new();
        mirror(&mut store, &state_with(1)).unwrap();
        mirror(&mut store, &state_with(2)).unwrap();
        store.put(SNAPSHOT_KEY, b"definitely not msgpack".to_vec());

        assert_eq!(recover(&store).unwrap().components.len(), 1);
    }

    #[test]
    fn journal_is_newest_first_and_capped() {
        let mut store = MemorySnapshotStore::new();
        for n in 0..12 {
            mirror(&mut store, &state_with(n)).unwrap();
        }
        let journal = history(&store);
        assert_eq!(journal.len(), MAX_HISTORY);
        assert_eq!(journal[0].components_count, 11);
        assert_eq!(journal[journal.len() - 1].components_count, 2);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode(b"junk"),
            Err(PersistError::Snapshot(_))
        ));
    }
}
