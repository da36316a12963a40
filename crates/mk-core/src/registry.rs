//! Component registry: the catalog of placeable component kinds.
//!
//! The registry is owned by the application and handed to the layers that
//! need it; nothing in this crate reaches for a global instance. Kind
//! validation happens here so callers get one consistent answer.

use crate::error::RegistryError;
use crate::model::PropMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Render surfaces a component kind supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSupports {
    pub client_render: bool,
    pub design_panel: bool,
}

impl Default for ComponentSupports {
    fn default() -> Self {
        Self {
            client_render: true,
            design_panel: true,
        }
    }
}

/// Catalog entry for one component kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub kind: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub accordion_group: String,
    #[serde(default)]
    pub supports: ComponentSupports,
    #[serde(default)]
    pub default_props: PropMap,
}

impl ComponentDefinition {
    /// Definition with the stock fallbacks for everything but the kind.
    pub fn synthesized(kind: &str) -> Self {
        let name = format_component_name(kind);
        Self {
            kind: kind.to_string(),
            description: format!("{name} component"),
            name,
            category: "general".to_string(),
            icon: "fa-solid fa-cube".to_string(),
            accordion_group: "basic".to_string(),
            supports: ComponentSupports::default(),
            default_props: PropMap::new(),
        }
    }
}

/// Category summary for the component palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub count: usize,
}

/// "video-intro" → "Video Intro".
pub fn format_component_name(kind: &str) -> String {
    kind.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "engagement" → "Engagement".
pub fn format_category_name(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Kind strings that are never legal, regardless of catalog contents.
/// These show up in documents corrupted by earlier renderer fallbacks.
const REJECTED_KINDS: [&str; 2] = ["unknown_type", "Unknown Component"];

const MAX_KIND_LEN: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    /// Empty registry. Most callers want [`ComponentRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the stock component catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for def in builtin_definitions() {
            registry.register(def);
        }
        registry
    }

    /// Registry built from a server-injected catalog payload.
    ///
    /// The payload is either a map of kind → definition, or an object with
    /// a `components` map (and an ignorable `categories` array, since
    /// categories are recounted from the definitions themselves). Missing
    /// definition fields fall back to the synthesized defaults for the
    /// kind. An empty or unusable payload yields the builtin catalog.
    pub fn from_injected(payload: &serde_json::Value) -> Self {
        let map = match payload.get("components") {
            Some(serde_json::Value::Object(map)) => Some(map),
            _ => payload.as_object(),
        };
        let Some(map) = map.filter(|m| !m.is_empty()) else {
            log::warn!("injected component catalog is empty or malformed, using builtins");
            return Self::with_builtins();
        };

        let mut registry = Self::new();
        for (kind, value) in map {
            match injected_definition(kind, value) {
                Some(def) => {
                    registry.register(def);
                }
                None => log::warn!("skipping malformed injected definition for '{kind}'"),
            }
        }
        if registry.is_empty() {
            log::warn!("no usable definitions in injected catalog, using builtins");
            return Self::with_builtins();
        }
        registry
    }

    /// Add or replace a definition. Returns the previous one, if any.
    pub fn register(&mut self, def: ComponentDefinition) -> Option<ComponentDefinition> {
        self.definitions.insert(def.kind.clone(), def)
    }

    pub fn has(&self, kind: &str) -> bool {
        self.definitions.contains_key(kind)
    }

    pub fn lookup(&self, kind: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(kind)
    }

    /// Definition for a kind, synthesizing a fallback for unknown kinds so
    /// render paths always have something to show.
    pub fn get(&self, kind: &str) -> ComponentDefinition {
        match self.definitions.get(kind) {
            Some(def) => def.clone(),
            None => {
                log::warn!("component kind '{kind}' not in registry, synthesizing definition");
                ComponentDefinition::synthesized(kind)
            }
        }
    }

    /// Strict validation for mutation paths: the kind must be well-formed
    /// and present in the catalog.
    pub fn validate_and_get(&self, kind: &str) -> Result<&ComponentDefinition, RegistryError> {
        if kind.is_empty() {
            return Err(RegistryError::MissingKind);
        }
        if REJECTED_KINDS.contains(&kind) {
            return Err(RegistryError::InvalidKind(kind.to_string()));
        }
        if kind.len() > MAX_KIND_LEN {
            return Err(RegistryError::KindTooLong { len: kind.len() });
        }
        self.definitions
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownKind {
                kind: kind.to_string(),
                available: self.kinds().collect::<Vec<_>>().join(", "),
            })
    }

    /// Starting props for a new component of this kind.
    pub fn default_props(&self, kind: &str) -> PropMap {
        self.definitions
            .get(kind)
            .map(|def| def.default_props.clone())
            .unwrap_or_default()
    }

    /// All definitions, ordered by kind.
    pub fn all(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn by_category(&self, category: &str) -> Vec<&ComponentDefinition> {
        self.definitions
            .values()
            .filter(|def| def.category == category)
            .collect()
    }

    /// Category summaries with per-category counts, ordered by slug.
    pub fn categories(&self) -> Vec<Category> {
        let mut map: BTreeMap<&str, usize> = BTreeMap::new();
        for def in self.definitions.values() {
            *map.entry(def.category.as_str()).or_insert(0) += 1;
        }
        map.into_iter()
            .map(|(slug, count)| Category {
                slug: slug.to_string(),
                name: format_category_name(slug),
                count,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// One injected definition, with synthesized fallbacks for absent fields.
/// Server payloads key definitions by kind, so an entry-level `kind` or
/// `type` field is accepted but the map key wins.
fn injected_definition(kind: &str, value: &serde_json::Value) -> Option<ComponentDefinition> {
    let obj = value.as_object()?;
    let mut def = ComponentDefinition::synthesized(kind);
    let text = |field: &str| obj.get(field).and_then(|v| v.as_str()).map(str::to_string);
    if let Some(name) = text("name").or_else(|| text("title")) {
        def.description = format!("{name} component");
        def.name = name;
    }
    if let Some(description) = text("description") {
        def.description = description;
    }
    if let Some(category) = text("category") {
        def.category = category;
    }
    if let Some(icon) = text("icon") {
        def.icon = icon;
    }
    if let Some(group) = text("accordion_group") {
        def.accordion_group = group;
    }
    if let Some(supports) = obj.get("supports") {
        if let Ok(supports) = serde_json::from_value(supports.clone()) {
            def.supports = supports;
        }
    }
    if let Some(serde_json::Value::Object(props)) = obj.get("default_props") {
        def.default_props = props.clone();
    }
    Some(def)
}

fn builtin(kind: &str, category: &str, icon: &str, group: &str) -> ComponentDefinition {
    ComponentDefinition {
        category: category.to_string(),
        icon: icon.to_string(),
        accordion_group: group.to_string(),
        ..ComponentDefinition::synthesized(kind)
    }
}

/// The stock catalog of media-kit components.
pub fn builtin_definitions() -> Vec<ComponentDefinition> {
    vec![
        builtin("hero", "essential", "fa-solid fa-star", "basic"),
        builtin("biography", "essential", "fa-solid fa-user", "basic"),
        builtin("topics", "essential", "fa-solid fa-list", "basic"),
        builtin("contact", "essential", "fa-solid fa-envelope", "basic"),
        builtin("social", "media", "fa-solid fa-share-nodes", "media"),
        builtin("logo-grid", "media", "fa-solid fa-table-cells", "media"),
        builtin("video-intro", "media", "fa-solid fa-video", "media"),
        builtin("podcast-player", "media", "fa-solid fa-podcast", "media"),
        builtin("questions", "engagement", "fa-solid fa-circle-question", "advanced"),
        builtin("interviews", "engagement", "fa-solid fa-microphone", "advanced"),
        builtin("offers", "engagement", "fa-solid fa-tag", "advanced"),
        builtin(
            "booking-calendar",
            "engagement",
            "fa-solid fa-calendar",
            "advanced",
        ),
    ]
}
