//! mk-core: document model, component registry, themes and the persisted
//! schema for the MK media-kit builder.
//!
//! Everything here is pure data and synchronous logic. Editing state lives
//! in `mk-editor`, HTML/CSS generation in `mk-render`, and server I/O in
//! `mk-persist`.

pub mod error;
pub mod id;
pub mod model;
pub mod registry;
pub mod schema;
pub mod theme;
pub mod validate;

pub use error::{RegistryError, SchemaError};
pub use id::{ComponentId, SectionId};
pub use model::*;
pub use registry::{ComponentDefinition, ComponentRegistry};
pub use theme::{Theme, ThemeCustomizations, ThemeSet};
