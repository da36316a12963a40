//! Error types for persistence: the network path and the local mirror.

use mk_core::error::SchemaError;
use thiserror::Error;

/// Why a save or load did not complete. None of these are retried
/// automatically; the embedding surfaces them and lets the user retry.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned HTTP {status}")]
    Http { status: u16 },

    #[error("security nonce was rejected")]
    NonceRejected,

    #[error("server rejected the request: {message}")]
    Rejected { message: String },

    #[error("malformed server response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("snapshot mirror error: {0}")]
    Snapshot(String),
}
