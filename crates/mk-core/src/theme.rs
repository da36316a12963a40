//! Built-in theme catalog and customization overlays.
//!
//! A theme bundles colors, typography, spacing and effects. Documents store
//! only the theme ID plus a sparse [`ThemeCustomizations`] overlay; the
//! merged values feed CSS variable generation downstream.

use crate::model::DEFAULT_THEME;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

// ─── Theme data ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_light: String,
    pub border: String,
    pub success: String,
    pub warning: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTypography {
    pub font_family: String,
    pub heading_family: String,
    pub base_font_size: f32,
    pub heading_scale: f32,
    pub line_height: f32,
    pub font_weight: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSpacing {
    pub base_unit: f32,
    pub component_gap: f32,
    pub section_padding: f32,
    pub container_max_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEffects {
    pub border_radius: String,
    /// "none", "subtle", "medium" or "strong".
    pub shadow_intensity: String,
    /// "none", "fast", "normal" or "slow".
    pub animation_speed: String,
    pub gradients: bool,
    pub blur_effects: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub description: String,
    pub colors: ThemeColors,
    pub typography: ThemeTypography,
    pub spacing: ThemeSpacing,
    pub effects: ThemeEffects,
}

// ─── Customizations ───────────────────────────────────────────────────────

/// Sparse per-document overrides, keyed by the camelCase field names used
/// in the persisted form ("textLight", "baseFontSize", ...). Unknown keys
/// are carried through untouched so older documents survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeCustomizations {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub colors: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub typography: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub spacing: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub effects: Map<String, Value>,
}

impl ThemeCustomizations {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.typography.is_empty()
            && self.spacing.is_empty()
            && self.effects.is_empty()
    }
}

fn overlay_str(map: &Map<String, Value>, key: &str, field: &mut String) {
    if let Some(s) = map.get(key).and_then(Value::as_str) {
        *field = s.to_string();
    }
}

fn overlay_f32(map: &Map<String, Value>, key: &str, field: &mut f32) {
    if let Some(n) = map.get(key).and_then(Value::as_f64) {
        *field = n as f32;
    }
}

fn overlay_bool(map: &Map<String, Value>, key: &str, field: &mut bool) {
    if let Some(b) = map.get(key).and_then(Value::as_bool) {
        *field = b;
    }
}

impl Theme {
    /// Theme with customizations applied on top. Keys the overlay does not
    /// set keep the theme's stock values.
    #[must_use]
    pub fn merged(&self, custom: &ThemeCustomizations) -> Theme {
        let mut out = self.clone();

        let c = &custom.colors;
        overlay_str(c, "primary", &mut out.colors.primary);
        overlay_str(c, "secondary", &mut out.colors.secondary);
        overlay_str(c, "background", &mut out.colors.background);
        overlay_str(c, "surface", &mut out.colors.surface);
        overlay_str(c, "text", &mut out.colors.text);
        overlay_str(c, "textLight", &mut out.colors.text_light);
        overlay_str(c, "border", &mut out.colors.border);
        overlay_str(c, "success", &mut out.colors.success);
        overlay_str(c, "warning", &mut out.colors.warning);
        overlay_str(c, "error", &mut out.colors.error);

        let t = &custom.typography;
        overlay_str(t, "fontFamily", &mut out.typography.font_family);
        overlay_str(t, "headingFamily", &mut out.typography.heading_family);
        overlay_f32(t, "baseFontSize", &mut out.typography.base_font_size);
        overlay_f32(t, "headingScale", &mut out.typography.heading_scale);
        overlay_f32(t, "lineHeight", &mut out.typography.line_height);
        if let Some(w) = t.get("fontWeight").and_then(Value::as_u64) {
            out.typography.font_weight = w as u16;
        }

        let s = &custom.spacing;
        overlay_f32(s, "baseUnit", &mut out.spacing.base_unit);
        overlay_f32(s, "componentGap", &mut out.spacing.component_gap);
        overlay_f32(s, "sectionPadding", &mut out.spacing.section_padding);
        overlay_f32(s, "containerMaxWidth", &mut out.spacing.container_max_width);

        let e = &custom.effects;
        overlay_str(e, "borderRadius", &mut out.effects.border_radius);
        overlay_str(e, "shadowIntensity", &mut out.effects.shadow_intensity);
        overlay_str(e, "animationSpeed", &mut out.effects.animation_speed);
        overlay_bool(e, "gradients", &mut out.effects.gradients);
        overlay_bool(e, "blurEffects", &mut out.effects.blur_effects);

        out
    }
}

// ─── Catalog ──────────────────────────────────────────────────────────────

static BUILTIN_THEMES: LazyLock<[Theme; 4]> = LazyLock::new(|| {
    [
        Theme {
            id: "professional".to_string(),
            name: "Professional Clean".to_string(),
            description: "Clean and professional design".to_string(),
            colors: ThemeColors {
                primary: "#3b82f6".to_string(),
                secondary: "#2563eb".to_string(),
                background: "#ffffff".to_string(),
                surface: "#f8fafc".to_string(),
                text: "#1e293b".to_string(),
                text_light: "#64748b".to_string(),
                border: "#e2e8f0".to_string(),
                success: "#10b981".to_string(),
                warning: "#f59e0b".to_string(),
                error: "#ef4444".to_string(),
            },
            typography: ThemeTypography {
                font_family: "'Inter', system-ui, sans-serif".to_string(),
                heading_family: "'Inter', system-ui, sans-serif".to_string(),
                base_font_size: 16.0,
                heading_scale: 1.25,
                line_height: 1.6,
                font_weight: 400,
            },
            spacing: ThemeSpacing {
                base_unit: 8.0,
                component_gap: 24.0,
                section_padding: 40.0,
                container_max_width: 1200.0,
            },
            effects: ThemeEffects {
                border_radius: "8px".to_string(),
                shadow_intensity: "medium".to_string(),
                animation_speed: "normal".to_string(),
                gradients: false,
                blur_effects: false,
            },
        },
        Theme {
            id: "creative".to_string(),
            name: "Creative Bold".to_string(),
            description: "Bold and creative design".to_string(),
            colors: ThemeColors {
                primary: "#f97316".to_string(),
                secondary: "#ea580c".to_string(),
                background: "#fffbf5".to_string(),
                surface: "#fff7ed".to_string(),
                text: "#1f2937".to_string(),
                text_light: "#78716c".to_string(),
                border: "#fed7aa".to_string(),
                success: "#84cc16".to_string(),
                warning: "#fbbf24".to_string(),
                error: "#dc2626".to_string(),
            },
            typography: ThemeTypography {
                font_family: "'Poppins', system-ui, sans-serif".to_string(),
                heading_family: "'Playfair Display', serif".to_string(),
                base_font_size: 17.0,
                heading_scale: 1.3,
                line_height: 1.7,
                font_weight: 400,
            },
            spacing: ThemeSpacing {
                base_unit: 10.0,
                component_gap: 32.0,
                section_padding: 48.0,
                container_max_width: 1280.0,
            },
            effects: ThemeEffects {
                border_radius: "12px".to_string(),
                shadow_intensity: "strong".to_string(),
                animation_speed: "normal".to_string(),
                gradients: true,
                blur_effects: false,
            },
        },
        Theme {
            id: "minimal".to_string(),
            name: "Minimal Elegant".to_string(),
            description: "Minimal and elegant design".to_string(),
            colors: ThemeColors {
                primary: "#18181b".to_string(),
                secondary: "#27272a".to_string(),
                background: "#ffffff".to_string(),
                surface: "#fafafa".to_string(),
                text: "#18181b".to_string(),
                text_light: "#71717a".to_string(),
                border: "#e4e4e7".to_string(),
                success: "#22c55e".to_string(),
                warning: "#eab308".to_string(),
                error: "#f87171".to_string(),
            },
            typography: ThemeTypography {
                font_family: "'Helvetica Neue', system-ui, sans-serif".to_string(),
                heading_family: "'Georgia', serif".to_string(),
                base_font_size: 16.0,
                heading_scale: 1.2,
                line_height: 1.5,
                font_weight: 300,
            },
            spacing: ThemeSpacing {
                base_unit: 8.0,
                component_gap: 20.0,
                section_padding: 32.0,
                container_max_width: 1100.0,
            },
            effects: ThemeEffects {
                border_radius: "2px".to_string(),
                shadow_intensity: "subtle".to_string(),
                animation_speed: "fast".to_string(),
                gradients: false,
                blur_effects: false,
            },
        },
        Theme {
            id: "dark".to_string(),
            name: "Modern Dark".to_string(),
            description: "Modern dark theme".to_string(),
            colors: ThemeColors {
                primary: "#8b5cf6".to_string(),
                secondary: "#7c3aed".to_string(),
                background: "#0f172a".to_string(),
                surface: "#1e293b".to_string(),
                text: "#f1f5f9".to_string(),
                text_light: "#94a3b8".to_string(),
                border: "#334155".to_string(),
                success: "#4ade80".to_string(),
                warning: "#fbbf24".to_string(),
                error: "#f87171".to_string(),
            },
            typography: ThemeTypography {
                font_family: "'Inter', system-ui, sans-serif".to_string(),
                heading_family: "'Inter', system-ui, sans-serif".to_string(),
                base_font_size: 16.0,
                heading_scale: 1.25,
                line_height: 1.6,
                font_weight: 400,
            },
            spacing: ThemeSpacing {
                base_unit: 8.0,
                component_gap: 24.0,
                section_padding: 40.0,
                container_max_width: 1200.0,
            },
            effects: ThemeEffects {
                border_radius: "8px".to_string(),
                shadow_intensity: "strong".to_string(),
                animation_speed: "normal".to_string(),
                gradients: true,
                blur_effects: true,
            },
        },
    ]
});

/// All built-in themes, default first.
pub fn builtin_themes() -> &'static [Theme] {
    &*BUILTIN_THEMES
}

/// Look up a built-in theme by ID.
pub fn theme_by_id(id: &str) -> Option<&'static Theme> {
    BUILTIN_THEMES.iter().find(|t| t.id == id)
}

/// Look up a theme, falling back to the default when the ID is unknown.
pub fn resolve_theme(id: &str) -> &'static Theme {
    theme_by_id(id).unwrap_or(&BUILTIN_THEMES[0])
}

/// Theme catalog handed to the rendering layer: the built-ins plus any
/// custom themes registered at runtime.
#[derive(Debug, Clone)]
pub struct ThemeSet {
    themes: BTreeMap<String, Theme>,
}

impl ThemeSet {
    /// Catalog seeded with the four built-in themes.
    pub fn builtin() -> Self {
        let mut themes = BTreeMap::new();
        for theme in builtin_themes() {
            themes.insert(theme.id.clone(), theme.clone());
        }
        Self { themes }
    }

    /// Add or replace a theme. Returns the previous one under that ID.
    pub fn register(&mut self, theme: Theme) -> Option<Theme> {
        self.themes.insert(theme.id.clone(), theme)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.themes.contains_key(id)
    }

    /// IDs in stable order, for the theme switcher.
    pub fn ids(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    /// Look up a theme. Unknown IDs fall back to the default so a stale
    /// document still renders.
    pub fn get(&self, id: &str) -> &Theme {
        if let Some(theme) = self.themes.get(id) {
            return theme;
        }
        log::warn!("unknown theme '{id}', falling back to '{DEFAULT_THEME}'");
        self.themes
            .get(DEFAULT_THEME)
            .unwrap_or_else(|| resolve_theme(DEFAULT_THEME))
    }

    /// Theme with customizations overlaid, ready for CSS generation.
    #[must_use]
    pub fn resolve(&self, id: &str, custom: &ThemeCustomizations) -> Theme {
        self.get(id).merged(custom)
    }
}

/// Quick primary/secondary color pairs offered in the customizer.
pub const COLOR_PRESETS: [(&str, &str, &str); 8] = [
    ("blue", "#3b82f6", "#2563eb"),
    ("green", "#10b981", "#059669"),
    ("purple", "#8b5cf6", "#7c3aed"),
    ("red", "#ef4444", "#dc2626"),
    ("orange", "#f97316", "#ea580c"),
    ("pink", "#ec4899", "#db2777"),
    ("teal", "#14b8a6", "#0d9488"),
    ("indigo", "#6366f1", "#4f46e5"),
];

/// (primary, secondary) for a named preset.
pub fn color_preset(name: &str) -> Option<(&'static str, &'static str)> {
    COLOR_PRESETS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, primary, secondary)| (*primary, *secondary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn catalog_has_four_themes_default_first() {
        let themes = builtin_themes();
        assert_eq!(themes.len(), 4);
        assert_eq!(themes[0].id, "professional");
        assert!(theme_by_id("dark").is_some());
        assert!(theme_by_id("nope").is_none());
    }

    #[test]
    fn unknown_theme_resolves_to_default() {
        assert_eq!(resolve_theme("missing").id, "professional");
        assert_eq!(resolve_theme("creative").id, "creative");
    }

    #[test]
    fn merged_applies_only_set_keys() {
        let theme = resolve_theme("professional");
        let mut custom = ThemeCustomizations::default();
        custom
            .colors
            .insert("primary".to_string(), json!("#ec4899"));
        custom
            .typography
            .insert("baseFontSize".to_string(), json!(18));

        let merged = theme.merged(&custom);
        assert_eq!(merged.colors.primary, "#ec4899");
        assert_eq!(merged.colors.secondary, "#2563eb");
        assert_eq!(merged.typography.base_font_size, 18.0);
        assert_eq!(merged.typography.line_height, 1.6);
    }

    #[test]
    fn overlay_ignores_wrongly_typed_values() {
        let theme = resolve_theme("minimal");
        let mut custom = ThemeCustomizations::default();
        custom.colors.insert("primary".to_string(), json!(12));
        custom
            .effects
            .insert("gradients".to_string(), json!("yes"));

        let merged = theme.merged(&custom);
        assert_eq!(merged.colors.primary, theme.colors.primary);
        assert_eq!(merged.effects.gradients, theme.effects.gradients);
    }

    #[test]
    fn customizations_serde_skips_empty_groups() {
        let custom = ThemeCustomizations::default();
        let v = serde_json::to_value(&custom).unwrap();
        assert_eq!(v, json!({}));

        let parsed: ThemeCustomizations = serde_json::from_value(json!({
            "colors": { "primary": "#111111" }
        }))
        .unwrap();
        assert_eq!(parsed.colors.len(), 1);
        assert!(parsed.typography.is_empty());
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(color_preset("teal"), Some(("#14b8a6", "#0d9488")));
        assert_eq!(color_preset("magenta"), None);
    }

    #[test]
    fn theme_set_falls_back_and_accepts_custom_themes() {
        let mut set = ThemeSet::builtin();
        assert_eq!(set.ids().len(), 4);
        assert_eq!(set.get("nope").id, "professional");

        let mut custom = resolve_theme("dark").clone();
        custom.id = "midnight".to_string();
        custom.colors.primary = "#22d3ee".to_string();
        assert!(set.register(custom).is_none());
        assert_eq!(set.get("midnight").colors.primary, "#22d3ee");
    }

    #[test]
    fn theme_set_resolve_merges_customizations() {
        let set = ThemeSet::builtin();
        let mut custom = ThemeCustomizations::default();
        custom
            .colors
            .insert("primary".to_string(), json!("#0d9488"));
        let resolved = set.resolve("creative", &custom);
        assert_eq!(resolved.colors.primary, "#0d9488");
        assert_eq!(resolved.id, "creative");
    }
}
