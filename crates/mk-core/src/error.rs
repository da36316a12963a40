//! Error types for the core document model.

use thiserror::Error;

/// Errors from component-kind validation against the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("component kind is required")]
    MissingKind,

    #[error("component kind is too long ({len} chars); kinds are short identifiers, not content")]
    KindTooLong { len: usize },

    #[error("invalid component kind: \"{0}\"")]
    InvalidKind(String),

    #[error("unknown component kind: \"{kind}\"; available: {available}")]
    UnknownKind { kind: String, available: String },
}

/// Errors from decoding a persisted document blob.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("persisted state is not a JSON object")]
    NotAnObject,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
