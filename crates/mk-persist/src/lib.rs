//! mk-persist: server I/O for the MK media-kit builder.
//!
//! Documents live as one JSON blob in WordPress post meta, reached
//! through `admin-ajax.php`. This crate wraps that endpoint
//! ([`AjaxClient`]), keeps a local crash-recovery mirror
//! ([`SnapshotStore`]), schedules debounced autosaves ([`Autosaver`]),
//! and drives the whole lifecycle through [`PersistService`].

pub mod autosave;
pub mod client;
pub mod error;
pub mod service;
pub mod snapshot;

pub use autosave::{AUTOSAVE_DEBOUNCE, Autosaver, note_dispatch};
pub use client::{AjaxClient, SaveReceipt};
pub use error::PersistError;
pub use service::{EditorEvent, PersistService};
pub use snapshot::{MemorySnapshotStore, SnapshotMeta, SnapshotStore};
