//! Core document model: components, sections, placements, global settings.
//!
//! `MediaKitState` is the single in-memory representation of the media kit
//! being edited. Composition has one owner: a `Section` stores `Placement`
//! records for the components it holds, and components carry no back-pointer.
//! Reverse lookups go through [`MediaKitState::placement_of`].

use crate::id::{ComponentId, SectionId};
use crate::theme::ThemeCustomizations;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Open string→value map used for component props and loose settings.
pub type PropMap = Map<String, Value>;

/// Version stamp written into every persisted document.
pub const STATE_VERSION: &str = "2.0.0";

/// Theme applied when a document does not name one.
pub const DEFAULT_THEME: &str = "professional";

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─── Components ───────────────────────────────────────────────────────────

/// A single content block (hero, biography, topics, ...) placed in the
/// document. The `kind` is a registry key; `props` is the open config map
/// edited through the design panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: PropMap,
}

impl Component {
    /// Create a component with a freshly generated ID.
    pub fn new(kind: &str) -> Self {
        Self {
            id: ComponentId::generate(kind),
            kind: kind.to_string(),
            props: PropMap::new(),
        }
    }

    /// Create a component with an explicit ID (load paths, tests).
    pub fn with_id(id: ComponentId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            props: PropMap::new(),
        }
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = props;
        self
    }
}

// ─── Sections ─────────────────────────────────────────────────────────────

/// Layout flavor of a section row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    FullWidth,
    TwoColumn,
    ThreeColumn,
    Sidebar,
    Grid,
    Hero,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::FullWidth => "full_width",
            SectionKind::TwoColumn => "two_column",
            SectionKind::ThreeColumn => "three_column",
            SectionKind::Sidebar => "sidebar",
            SectionKind::Grid => "grid",
            SectionKind::Hero => "hero",
        }
    }

    /// Parse a persisted kind string. Unknown strings return `None`;
    /// load paths fall back to [`SectionKind::FullWidth`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full_width" => Some(SectionKind::FullWidth),
            "two_column" => Some(SectionKind::TwoColumn),
            "three_column" => Some(SectionKind::ThreeColumn),
            "sidebar" => Some(SectionKind::Sidebar),
            "grid" => Some(SectionKind::Grid),
            "hero" => Some(SectionKind::Hero),
            _ => None,
        }
    }

    pub fn all() -> [SectionKind; 6] {
        [
            SectionKind::FullWidth,
            SectionKind::TwoColumn,
            SectionKind::ThreeColumn,
            SectionKind::Sidebar,
            SectionKind::Grid,
            SectionKind::Hero,
        ]
    }
}

/// CSS-facing layout values of a section. Strings hold CSS lengths so they
/// pass through to generated stylesheets untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    /// "full_width" or "constrained".
    pub width: String,
    pub max_width: String,
    pub padding: String,
    pub columns: u8,
    pub column_gap: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_template_columns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
}

/// Sparse layout override, applied per responsive breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_template_columns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,
}

impl LayoutPatch {
    pub fn is_empty(&self) -> bool {
        self.padding.is_none()
            && self.columns.is_none()
            && self.column_gap.is_none()
            && self.grid_template_columns.is_none()
            && self.min_height.is_none()
    }
}

/// Overlay `patch` onto `dst`, keeping unset fields.
pub fn merge_layout(dst: &mut SectionLayout, patch: &LayoutPatch) {
    if let Some(ref padding) = patch.padding {
        dst.padding = padding.clone();
    }
    if let Some(columns) = patch.columns {
        dst.columns = columns;
    }
    if let Some(ref gap) = patch.column_gap {
        dst.column_gap = gap.clone();
    }
    if let Some(ref template) = patch.grid_template_columns {
        dst.grid_template_columns = Some(template.clone());
    }
    if let Some(ref min_height) = patch.min_height {
        dst.min_height = Some(min_height.clone());
    }
}

/// Background and spacing knobs exposed in the section settings panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionOptions {
    /// "none", "color" or "gradient".
    pub background_type: String,
    pub background_color: String,
    pub spacing_top: String,
    pub spacing_bottom: String,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            background_type: "none".to_string(),
            background_color: "transparent".to_string(),
            spacing_top: "medium".to_string(),
            spacing_bottom: "medium".to_string(),
        }
    }
}

/// Per-breakpoint layout overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveOverrides {
    #[serde(default)]
    pub mobile: LayoutPatch,
    #[serde(default)]
    pub tablet: LayoutPatch,
}

/// A section's record that a component occupies one of its columns.
/// This is the single source of truth for composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(rename = "component_id")]
    pub component: ComponentId,
    /// 1-based column index, clamped to the section's column count.
    pub column: u8,
    /// Position within the column; kept dense from 0.
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<u64>,
}

/// A layout container (row) holding one or more columns of components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "section_id")]
    pub id: SectionId,
    #[serde(rename = "section_type")]
    pub kind: SectionKind,
    pub layout: SectionLayout,
    #[serde(rename = "section_options")]
    pub options: SectionOptions,
    #[serde(default)]
    pub responsive: ResponsiveOverrides,
    #[serde(rename = "components", default)]
    pub placements: SmallVec<[Placement; 4]>,
}

impl Section {
    /// Create a section with the default configuration for its kind.
    pub fn new(id: SectionId, kind: SectionKind) -> Self {
        let (layout, options, responsive) = default_configuration(kind);
        Self {
            id,
            kind,
            layout,
            options,
            responsive,
            placements: SmallVec::new(),
        }
    }

    /// Effective column count for placement purposes (never 0).
    pub fn column_count(&self) -> u8 {
        self.layout.columns.max(1)
    }

    pub fn contains(&self, component: ComponentId) -> bool {
        self.placements.iter().any(|p| p.component == component)
    }

    pub fn placement(&self, component: ComponentId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.component == component)
    }

    /// Component IDs ordered by (column, order), which is the render order.
    pub fn components_in_order(&self) -> Vec<ComponentId> {
        let mut sorted: Vec<&Placement> = self.placements.iter().collect();
        sorted.sort_by_key(|p| (p.column, p.order));
        sorted.iter().map(|p| p.component).collect()
    }

    /// Components of one column, in order.
    pub fn column_components(&self, column: u8) -> Vec<ComponentId> {
        let mut sorted: Vec<&Placement> = self
            .placements
            .iter()
            .filter(|p| p.column == column)
            .collect();
        sorted.sort_by_key(|p| p.order);
        sorted.iter().map(|p| p.component).collect()
    }

    /// Insert a placement, clamping the column and renumbering the column
    /// densely. `index` is the position within the column; `None` appends.
    /// An existing placement of the same component is replaced.
    pub fn place(&mut self, component: ComponentId, column: u8, index: Option<usize>) {
        self.remove_component(component);
        let column = column.clamp(1, self.column_count());

        let mut in_column: Vec<usize> = (0..self.placements.len())
            .filter(|&i| self.placements[i].column == column)
            .collect();
        in_column.sort_by_key(|&i| self.placements[i].order);

        let at = index.unwrap_or(in_column.len()).min(in_column.len());
        // Shift orders at and after the insertion point.
        for (pos, &i) in in_column.iter().enumerate() {
            self.placements[i].order = if pos >= at { pos as u32 + 1 } else { pos as u32 };
        }
        self.placements.push(Placement {
            component,
            column,
            order: at as u32,
            assigned_at: Some(epoch_ms()),
        });
    }

    /// Drop a component's placement. Returns true when one was removed.
    pub fn remove_component(&mut self, component: ComponentId) -> bool {
        let before = self.placements.len();
        self.placements.retain(|p| p.component != component);
        let removed = self.placements.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Swap a placed component with its neighbor within the same column.
    /// Returns false when it is already at the boundary.
    pub fn shift_within_column(&mut self, component: ComponentId, towards_start: bool) -> bool {
        let column = match self.placement(component) {
            Some(p) => p.column,
            None => return false,
        };
        let ordered = self.column_components(column);
        let pos = match ordered.iter().position(|&c| c == component) {
            Some(pos) => pos,
            None => return false,
        };
        let swap_with = if towards_start {
            if pos == 0 {
                return false;
            }
            ordered[pos - 1]
        } else {
            if pos + 1 >= ordered.len() {
                return false;
            }
            ordered[pos + 1]
        };

        let order_a = self.placement(component).map(|p| p.order);
        let order_b = self.placement(swap_with).map(|p| p.order);
        if let (Some(a), Some(b)) = (order_a, order_b) {
            for p in self.placements.iter_mut() {
                if p.component == component {
                    p.order = b;
                } else if p.component == swap_with {
                    p.order = a;
                }
            }
            return true;
        }
        false
    }

    /// Re-assign dense orders per column, preserving relative order.
    /// Callers that touch `placements` or shrink `layout.columns` directly
    /// use this to restore the dense-order invariant.
    pub fn renumber(&mut self) {
        for column in 1..=self.column_count() {
            let mut in_column: Vec<usize> = (0..self.placements.len())
                .filter(|&i| self.placements[i].column == column)
                .collect();
            in_column.sort_by_key(|&i| self.placements[i].order);
            for (pos, &i) in in_column.iter().enumerate() {
                self.placements[i].order = pos as u32;
            }
        }
    }
}

/// Stock configuration per section kind. Unknown kinds on load paths use
/// the full-width configuration.
pub fn default_configuration(
    kind: SectionKind,
) -> (SectionLayout, SectionOptions, ResponsiveOverrides) {
    let base_options = SectionOptions::default();
    let large_options = SectionOptions {
        spacing_top: "large".to_string(),
        spacing_bottom: "large".to_string(),
        ..SectionOptions::default()
    };

    match kind {
        SectionKind::FullWidth => (
            SectionLayout {
                width: "full_width".to_string(),
                max_width: "100%".to_string(),
                padding: "40px 20px".to_string(),
                columns: 1,
                column_gap: "0px".to_string(),
                display: None,
                grid_template_columns: None,
                row_gap: None,
                min_height: None,
                align_items: None,
                justify_content: None,
            },
            base_options,
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    padding: Some("20px 15px".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch {
                    padding: Some("30px 20px".to_string()),
                    ..LayoutPatch::default()
                },
            },
        ),
        SectionKind::TwoColumn => (
            SectionLayout {
                width: "constrained".to_string(),
                max_width: "1200px".to_string(),
                padding: "60px 20px".to_string(),
                columns: 2,
                column_gap: "40px".to_string(),
                display: None,
                grid_template_columns: None,
                row_gap: None,
                min_height: None,
                align_items: None,
                justify_content: None,
            },
            large_options,
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    columns: Some(1),
                    column_gap: Some("0px".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch {
                    columns: Some(2),
                    column_gap: Some("30px".to_string()),
                    ..LayoutPatch::default()
                },
            },
        ),
        SectionKind::ThreeColumn => (
            SectionLayout {
                width: "constrained".to_string(),
                max_width: "1200px".to_string(),
                padding: "60px 20px".to_string(),
                columns: 3,
                column_gap: "30px".to_string(),
                display: None,
                grid_template_columns: None,
                row_gap: None,
                min_height: None,
                align_items: None,
                justify_content: None,
            },
            large_options,
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    columns: Some(1),
                    column_gap: Some("0px".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch {
                    columns: Some(2),
                    column_gap: Some("20px".to_string()),
                    ..LayoutPatch::default()
                },
            },
        ),
        SectionKind::Sidebar => (
            SectionLayout {
                width: "constrained".to_string(),
                max_width: "1200px".to_string(),
                padding: "60px 20px".to_string(),
                columns: 2,
                column_gap: "40px".to_string(),
                display: None,
                grid_template_columns: Some("2fr 1fr".to_string()),
                row_gap: None,
                min_height: None,
                align_items: None,
                justify_content: None,
            },
            large_options,
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    columns: Some(1),
                    column_gap: Some("0px".to_string()),
                    grid_template_columns: Some("1fr".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch::default(),
            },
        ),
        SectionKind::Grid => (
            SectionLayout {
                width: "constrained".to_string(),
                max_width: "1200px".to_string(),
                padding: "60px 20px".to_string(),
                columns: 1,
                column_gap: "30px".to_string(),
                display: Some("grid".to_string()),
                grid_template_columns: Some("repeat(auto-fit, minmax(300px, 1fr))".to_string()),
                row_gap: Some("30px".to_string()),
                min_height: None,
                align_items: None,
                justify_content: None,
            },
            large_options,
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    grid_template_columns: Some("1fr".to_string()),
                    column_gap: Some("0px".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch {
                    grid_template_columns: Some("repeat(2, 1fr)".to_string()),
                    ..LayoutPatch::default()
                },
            },
        ),
        SectionKind::Hero => (
            SectionLayout {
                width: "full_width".to_string(),
                max_width: "100%".to_string(),
                padding: "80px 20px".to_string(),
                columns: 1,
                column_gap: "0px".to_string(),
                display: Some("flex".to_string()),
                grid_template_columns: None,
                row_gap: None,
                min_height: Some("70vh".to_string()),
                align_items: Some("center".to_string()),
                justify_content: Some("center".to_string()),
            },
            SectionOptions {
                background_type: "gradient".to_string(),
                background_color: "#295cff".to_string(),
                spacing_top: "none".to_string(),
                spacing_bottom: "large".to_string(),
            },
            ResponsiveOverrides {
                mobile: LayoutPatch {
                    min_height: Some("50vh".to_string()),
                    padding: Some("60px 15px".to_string()),
                    ..LayoutPatch::default()
                },
                tablet: LayoutPatch {
                    min_height: Some("60vh".to_string()),
                    padding: Some("70px 20px".to_string()),
                    ..LayoutPatch::default()
                },
            },
        ),
    }
}

// ─── Global settings ──────────────────────────────────────────────────────

/// Document-wide editor settings. Serde names follow the persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(rename = "layout")]
    pub layout_mode: String,
    pub responsive: bool,
    #[serde(rename = "autoSave")]
    pub auto_save: bool,
    #[serde(rename = "autoSaveInterval")]
    pub auto_save_interval_ms: u64,
    #[serde(default, flatten)]
    pub extra: PropMap,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            layout_mode: "vertical".to_string(),
            responsive: true,
            auto_save: true,
            auto_save_interval_ms: 30_000,
            extra: PropMap::new(),
        }
    }
}

// ─── Document state ───────────────────────────────────────────────────────

/// The full in-memory representation of a media kit.
///
/// Invariants, maintained by the dispatching layer:
/// - every ID in `layout` is a key of `components`, exactly once, and every
///   component appears in `layout` (authoritative top-level order);
/// - a component is placed in at most one section, at most once;
/// - every placement references an existing component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaKitState {
    pub components: BTreeMap<ComponentId, Component>,
    pub layout: Vec<ComponentId>,
    pub sections: Vec<Section>,
    pub theme: String,
    #[serde(rename = "themeCustomizations", default)]
    pub theme_customizations: ThemeCustomizations,
    #[serde(rename = "globalSettings", default)]
    pub global_settings: GlobalSettings,
    pub version: String,
}

impl Default for MediaKitState {
    fn default() -> Self {
        Self {
            components: BTreeMap::new(),
            layout: Vec::new(),
            sections: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
            theme_customizations: ThemeCustomizations::default(),
            global_settings: GlobalSettings::default(),
            version: STATE_VERSION.to_string(),
        }
    }
}

impl MediaKitState {
    /// Which section and column hold this component, if any.
    /// Derived from section placements; there is no stored back-pointer.
    pub fn placement_of(&self, component: ComponentId) -> Option<(SectionId, u8)> {
        self.sections.iter().find_map(|s| {
            s.placement(component)
                .map(|p| (s.id, p.column))
        })
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Components of one section, ordered by (column, order).
    pub fn section_components(&self, id: SectionId) -> Vec<ComponentId> {
        self.section(id)
            .map(Section::components_in_order)
            .unwrap_or_default()
    }

    pub fn section_position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn layout_position(&self, component: ComponentId) -> Option<usize> {
        self.layout.iter().position(|&c| c == component)
    }

    /// True when at least one section holds a component. Drives the
    /// sectioned vs. flat rendering mode.
    pub fn has_populated_sections(&self) -> bool {
        self.sections.iter().any(|s| !s.placements.is_empty())
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
