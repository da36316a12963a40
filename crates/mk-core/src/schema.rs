//! Persisted-document schema: the JSON blob exchanged with the server.
//!
//! Saving goes through [`to_wire`] so every write carries the same shape:
//! components as an ID-keyed map, the layout array, sections with embedded
//! placements, theme and settings. Loading goes through [`from_wire`], a
//! permissive pass that accepts the legacy shapes older saves used
//! (component arrays, `saved_components`, per-component `sectionId`) and
//! normalizes them, logging whatever it had to repair.

use crate::error::SchemaError;
use crate::id::{ComponentId, SectionId};
use crate::model::{
    Component, GlobalSettings, MediaKitState, Placement, PropMap, Section, SectionKind,
    SectionLayout, SectionOptions,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

// ─── Serialization ────────────────────────────────────────────────────────

/// Serialize a document to its wire form. Each component object carries a
/// derived `sectionId` (or null) so consumers of the blob can keep reading
/// it; in memory only sections own placement.
pub fn to_wire(state: &MediaKitState) -> Result<Value, SchemaError> {
    let mut root = match serde_json::to_value(state)? {
        Value::Object(map) => map,
        _ => return Err(SchemaError::NotAnObject),
    };

    if let Some(Value::Object(components)) = root.get_mut("components") {
        for (id, entry) in components.iter_mut() {
            if let Value::Object(comp) = entry {
                let placed = state
                    .placement_of(ComponentId::intern(id))
                    .map(|(section, _)| Value::String(section.as_str().to_string()))
                    .unwrap_or(Value::Null);
                comp.insert("sectionId".to_string(), placed);
            }
        }
    }

    Ok(Value::Object(root))
}

/// Wire form as a JSON string. Repeat calls on an unchanged document
/// produce byte-identical output.
pub fn to_json_string(state: &MediaKitState) -> Result<String, SchemaError> {
    Ok(serde_json::to_string(&to_wire(state)?)?)
}

// ─── Deserialization ──────────────────────────────────────────────────────

/// Decode a persisted blob into a document, normalizing legacy shapes.
/// Unusable entries are dropped with a log line rather than failing the
/// whole load; only a non-object root or invalid JSON is an error.
pub fn from_wire(value: Value) -> Result<MediaKitState, SchemaError> {
    let mut root = match value {
        Value::Object(map) => map,
        _ => return Err(SchemaError::NotAnObject),
    };

    // Legacy exports: `saved_components` array, `global_settings` key.
    if !root.contains_key("components") {
        if let Some(saved) = root.remove("saved_components") {
            root.insert("components".to_string(), saved);
        }
    }
    if !root.contains_key("globalSettings") {
        if let Some(settings) = root.remove("global_settings") {
            root.insert("globalSettings".to_string(), settings);
        }
    }

    let mut state = MediaKitState::default();
    let mut section_hints: Vec<(ComponentId, SectionId)> = Vec::new();
    // Order components arrived in; legacy array saves rely on it as the
    // document order when no layout array exists.
    let mut arrival: Vec<ComponentId> = Vec::new();

    match root.remove("components") {
        Some(Value::Object(map)) => {
            for (key, entry) in map {
                let Value::Object(comp) = entry else {
                    log::warn!("dropping component '{key}': not an object");
                    continue;
                };
                if let Some(id) =
                    insert_component(&mut state, ComponentId::intern(&key), comp, &mut section_hints)
                {
                    arrival.push(id);
                }
            }
        }
        Some(Value::Array(list)) => {
            log::warn!("components stored as an array, converting to ID-keyed map");
            for entry in list {
                let Value::Object(comp) = entry else {
                    continue;
                };
                let Some(id) = comp.get("id").and_then(Value::as_str).map(ComponentId::intern)
                else {
                    log::warn!("dropping component without an id");
                    continue;
                };
                if let Some(id) = insert_component(&mut state, id, comp, &mut section_hints) {
                    arrival.push(id);
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(_) => log::warn!("ignoring components of unexpected shape"),
    }

    if let Some(Value::Array(entries)) = root.remove("layout") {
        for entry in entries {
            let Some(id) = entry.as_str().map(ComponentId::intern) else {
                continue;
            };
            if !state.components.contains_key(&id) {
                log::warn!("dropping layout entry '{id}': no such component");
            } else if state.layout.contains(&id) {
                log::warn!("dropping repeated layout entry '{id}'");
            } else {
                state.layout.push(id);
            }
        }
    }
    // Components the layout array missed go at the end, in arrival order.
    for id in arrival {
        if !state.layout.contains(&id) {
            log::debug!("appending component '{id}' missing from layout");
            state.layout.push(id);
        }
    }

    if let Some(Value::Array(entries)) = root.remove("sections") {
        for entry in entries {
            let Value::Object(map) = entry else {
                continue;
            };
            let Some(section) = section_from_wire(map) else {
                continue;
            };
            if state.section(section.id).is_some() {
                log::warn!("dropping repeated section '{}'", section.id);
                continue;
            }
            state.sections.push(section);
        }
    }

    let placed = sanitize_placements(&mut state);
    apply_section_hints(&mut state, section_hints, &placed);

    if let Some(theme) = root.get("theme").and_then(Value::as_str) {
        if !theme.is_empty() {
            state.theme = theme.to_string();
        }
    }
    if let Some(custom) = root.remove("themeCustomizations") {
        if !custom.is_null() {
            match serde_json::from_value(custom) {
                Ok(parsed) => state.theme_customizations = parsed,
                Err(err) => log::warn!("ignoring malformed themeCustomizations: {err}"),
            }
        }
    }
    if let Some(Value::Object(settings)) = root.remove("globalSettings") {
        state.global_settings = global_settings_from_wire(settings);
    }
    if let Some(version) = root.get("version").and_then(Value::as_str) {
        state.version = version.to_string();
    }

    Ok(state)
}

/// [`from_wire`] over a raw JSON string.
pub fn from_json_str(raw: &str) -> Result<MediaKitState, SchemaError> {
    from_wire(serde_json::from_str(raw)?)
}

/// Returns the ID when the component was inserted, `None` when dropped.
fn insert_component(
    state: &mut MediaKitState,
    id: ComponentId,
    mut comp: Map<String, Value>,
    hints: &mut Vec<(ComponentId, SectionId)>,
) -> Option<ComponentId> {
    if state.components.contains_key(&id) {
        log::warn!("duplicate component id '{id}' in saved data, keeping the first");
        return None;
    }
    let Some(kind) = comp.get("type").and_then(Value::as_str).map(str::to_string) else {
        log::warn!("dropping component '{id}': missing type");
        return None;
    };
    let props = match comp.remove("props") {
        Some(Value::Object(props)) => props,
        _ => match comp.remove("data") {
            Some(Value::Object(data)) => data,
            _ => PropMap::new(),
        },
    };
    if let Some(section) = comp
        .get("sectionId")
        .or_else(|| comp.get("section_id"))
        .and_then(Value::as_str)
    {
        hints.push((id, SectionId::intern(section)));
    }
    state.components.insert(id, Component { id, kind, props });
    Some(id)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutOverlay {
    width: Option<String>,
    max_width: Option<String>,
    padding: Option<String>,
    columns: Option<u8>,
    column_gap: Option<String>,
    display: Option<String>,
    grid_template_columns: Option<String>,
    row_gap: Option<String>,
    min_height: Option<String>,
    align_items: Option<String>,
    justify_content: Option<String>,
}

impl LayoutOverlay {
    fn apply_to(self, layout: &mut SectionLayout) {
        if let Some(width) = self.width {
            layout.width = width;
        }
        if let Some(max_width) = self.max_width {
            layout.max_width = max_width;
        }
        if let Some(padding) = self.padding {
            layout.padding = padding;
        }
        if let Some(columns) = self.columns {
            layout.columns = columns;
        }
        if let Some(gap) = self.column_gap {
            layout.column_gap = gap;
        }
        if self.display.is_some() {
            layout.display = self.display;
        }
        if self.grid_template_columns.is_some() {
            layout.grid_template_columns = self.grid_template_columns;
        }
        if self.row_gap.is_some() {
            layout.row_gap = self.row_gap;
        }
        if self.min_height.is_some() {
            layout.min_height = self.min_height;
        }
        if self.align_items.is_some() {
            layout.align_items = self.align_items;
        }
        if self.justify_content.is_some() {
            layout.justify_content = self.justify_content;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionsOverlay {
    background_type: Option<String>,
    background_color: Option<String>,
    spacing_top: Option<String>,
    spacing_bottom: Option<String>,
}

impl OptionsOverlay {
    fn apply_to(self, options: &mut SectionOptions) {
        if let Some(background_type) = self.background_type {
            options.background_type = background_type;
        }
        if let Some(background_color) = self.background_color {
            options.background_color = background_color;
        }
        if let Some(spacing_top) = self.spacing_top {
            options.spacing_top = spacing_top;
        }
        if let Some(spacing_bottom) = self.spacing_bottom {
            options.spacing_bottom = spacing_bottom;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePlacement {
    component_id: Option<String>,
    column: Option<u8>,
    order: Option<u32>,
    assigned_at: Option<u64>,
}

fn section_from_wire(mut map: Map<String, Value>) -> Option<Section> {
    let Some(id) = map
        .get("section_id")
        .and_then(Value::as_str)
        .map(SectionId::intern)
    else {
        log::warn!("dropping section without a section_id");
        return None;
    };

    let kind_raw = map
        .get("section_type")
        .and_then(Value::as_str)
        .unwrap_or("full_width");
    let kind = SectionKind::parse(kind_raw).unwrap_or_else(|| {
        log::warn!("section '{id}' has unknown type '{kind_raw}', using full_width");
        SectionKind::FullWidth
    });

    // Start from the kind's defaults and overlay whatever the blob stored.
    let mut section = Section::new(id, kind);
    if let Some(layout) = map.remove("layout") {
        match serde_json::from_value::<LayoutOverlay>(layout) {
            Ok(overlay) => overlay.apply_to(&mut section.layout),
            Err(err) => log::warn!("section '{id}' has a malformed layout: {err}"),
        }
    }
    if let Some(options) = map.remove("section_options") {
        match serde_json::from_value::<OptionsOverlay>(options) {
            Ok(overlay) => overlay.apply_to(&mut section.options),
            Err(err) => log::warn!("section '{id}' has malformed options: {err}"),
        }
    }
    if let Some(responsive) = map.remove("responsive") {
        if !responsive.is_null() {
            match serde_json::from_value(responsive) {
                Ok(parsed) => section.responsive = parsed,
                Err(err) => log::warn!("section '{id}' has malformed responsive data: {err}"),
            }
        }
    }

    if let Some(Value::Array(entries)) = map.remove("components") {
        for (position, entry) in entries.into_iter().enumerate() {
            match entry {
                // Oldest saves stored a bare list of component IDs.
                Value::String(component) => section.placements.push(Placement {
                    component: ComponentId::intern(&component),
                    column: 1,
                    order: position as u32,
                    assigned_at: None,
                }),
                Value::Object(_) => match serde_json::from_value::<WirePlacement>(entry) {
                    Ok(wire) => {
                        let Some(component) = wire.component_id else {
                            log::warn!("dropping placement without component_id in '{id}'");
                            continue;
                        };
                        section.placements.push(Placement {
                            component: ComponentId::intern(&component),
                            column: wire.column.unwrap_or(1),
                            order: wire.order.unwrap_or(position as u32),
                            assigned_at: wire.assigned_at,
                        });
                    }
                    Err(err) => log::warn!("dropping malformed placement in '{id}': {err}"),
                },
                _ => {}
            }
        }
    }

    Some(section)
}

/// Drop placements that point at missing components or duplicate an
/// earlier one, clamp columns, and renumber. Returns the set of placed
/// component IDs.
fn sanitize_placements(state: &mut MediaKitState) -> BTreeSet<ComponentId> {
    let known: BTreeSet<ComponentId> = state.components.keys().copied().collect();
    let mut placed: BTreeSet<ComponentId> = BTreeSet::new();

    for section in &mut state.sections {
        let columns = section.column_count();
        let section_id = section.id;
        section.placements.retain(|p| {
            if !known.contains(&p.component) {
                log::warn!(
                    "dropping placement of missing component '{}' in '{section_id}'",
                    p.component
                );
                return false;
            }
            if !placed.insert(p.component) {
                log::warn!(
                    "component '{}' placed more than once, keeping the first",
                    p.component
                );
                return false;
            }
            true
        });
        for p in section.placements.iter_mut() {
            p.column = p.column.clamp(1, columns);
        }
        section.renumber();
    }

    placed
}

/// Reconcile per-component `sectionId` values against section placements.
/// Sections are authoritative; the hint only recovers components that lost
/// their placement record.
fn apply_section_hints(
    state: &mut MediaKitState,
    hints: Vec<(ComponentId, SectionId)>,
    placed: &BTreeSet<ComponentId>,
) {
    for (component, section_id) in hints {
        if placed.contains(&component) {
            let current = state.placement_of(component).map(|(s, _)| s);
            if current != Some(section_id) {
                log::debug!(
                    "component '{component}' sectionId disagrees with placements, sections win"
                );
            }
            continue;
        }
        match state.section_mut(section_id) {
            Some(section) => {
                log::debug!("recovering placement of '{component}' from its sectionId");
                section.place(component, 1, None);
            }
            None => log::warn!(
                "component '{component}' references missing section '{section_id}'"
            ),
        }
    }
}

fn global_settings_from_wire(map: Map<String, Value>) -> GlobalSettings {
    let mut out = GlobalSettings::default();
    let mut extra = PropMap::new();
    for (key, value) in map {
        match (key.as_str(), &value) {
            ("layout", Value::String(s)) => out.layout_mode = s.clone(),
            ("responsive", Value::Bool(b)) => out.responsive = *b,
            ("autoSave", Value::Bool(b)) => out.auto_save = *b,
            ("autoSaveInterval", Value::Number(_)) => match value.as_u64() {
                Some(n) => out.auto_save_interval_ms = n,
                None => {
                    extra.insert(key, value);
                }
            },
            _ => {
                extra.insert(key, value);
            }
        }
    }
    out.extra = extra;
    out
}
