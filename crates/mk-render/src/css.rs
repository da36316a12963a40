//! Generated stylesheets: theme variables and per-section layout rules.
//!
//! Theme values become `--gmkb-*` custom properties scoped to the
//! rendered root's `data-gmkb-theme` attribute; component styles consume
//! the variables and never hardcode theme values. Section rules target
//! the section's inner container, with tablet and mobile `@media` blocks
//! layered from the sparse responsive overrides.

use mk_core::model::{LayoutPatch, Section, SectionLayout, SectionOptions};
use mk_core::theme::{Theme, ThemeCustomizations};
use std::fmt::Write;

const TABLET_MAX_WIDTH: &str = "1024px";
const MOBILE_MAX_WIDTH: &str = "768px";

// ─── Theme variables ────────────────────────────────────────────────────────

/// Emit the theme's CSS custom properties, customizations applied.
#[must_use]
pub fn theme_css(theme: &Theme, custom: &ThemeCustomizations) -> String {
    let t = theme.merged(custom);
    let mut out = String::with_capacity(2048);
    let _ = writeln!(out, r#"[data-gmkb-theme="{}"] {{"#, t.id);

    let c = &t.colors;
    for (name, value) in [
        ("primary", &c.primary),
        ("secondary", &c.secondary),
        ("background", &c.background),
        ("surface", &c.surface),
        ("text", &c.text),
        ("text-light", &c.text_light),
        ("border", &c.border),
        ("success", &c.success),
        ("warning", &c.warning),
        ("error", &c.error),
    ] {
        let _ = writeln!(out, "  --gmkb-color-{name}: {value};");
    }

    let ty = &t.typography;
    let _ = writeln!(out, "  --gmkb-font-primary: {};", ty.font_family);
    let _ = writeln!(out, "  --gmkb-font-heading: {};", ty.heading_family);
    let base = ty.base_font_size;
    for (name, factor) in [
        ("base", 1.0),
        ("sm", 0.875),
        ("lg", 1.125),
        ("xl", 1.25),
        ("2xl", 1.5),
        ("3xl", 1.875),
    ] {
        let _ = writeln!(
            out,
            "  --gmkb-font-size-{name}: {}px;",
            format_num(base * factor)
        );
    }
    let _ = writeln!(out, "  --gmkb-line-height: {};", format_num(ty.line_height));
    let _ = writeln!(out, "  --gmkb-font-weight: {};", ty.font_weight);
    let _ = writeln!(out, "  --gmkb-heading-scale: {};", format_num(ty.heading_scale));

    let sp = &t.spacing;
    let unit = sp.base_unit;
    for (name, factor) in [
        ("xs", 0.5),
        ("sm", 0.75),
        ("md", 1.0),
        ("lg", 1.5),
        ("xl", 2.0),
        ("2xl", 3.0),
        ("3xl", 4.0),
    ] {
        let _ = writeln!(
            out,
            "  --gmkb-spacing-{name}: {}px;",
            format_num(unit * factor)
        );
    }
    let _ = writeln!(
        out,
        "  --gmkb-spacing-component-gap: {}px;",
        format_num(sp.component_gap)
    );
    let _ = writeln!(
        out,
        "  --gmkb-spacing-section-padding: {}px;",
        format_num(sp.section_padding)
    );
    let _ = writeln!(
        out,
        "  --gmkb-container-max-width: {}px;",
        format_num(sp.container_max_width)
    );

    let fx = &t.effects;
    let _ = writeln!(out, "  --gmkb-border-radius: {};", fx.border_radius);
    let _ = writeln!(
        out,
        "  --gmkb-border-radius-sm: calc({} * 0.5);",
        fx.border_radius
    );
    let _ = writeln!(
        out,
        "  --gmkb-border-radius-lg: calc({} * 1.5);",
        fx.border_radius
    );
    let _ = writeln!(out, "  --gmkb-shadow: {};", shadow_value(&fx.shadow_intensity));
    let _ = writeln!(out, "  --gmkb-shadow-sm: 0 1px 2px rgba(0, 0, 0, 0.05);");
    let _ = writeln!(out, "  --gmkb-shadow-lg: 0 20px 40px rgba(0, 0, 0, 0.2);");
    let _ = writeln!(
        out,
        "  --gmkb-transition-speed: {};",
        speed_value(&fx.animation_speed)
    );

    out.push_str("}\n");
    out
}

fn shadow_value(intensity: &str) -> &'static str {
    match intensity {
        "none" => "none",
        "subtle" => "0 1px 3px rgba(0, 0, 0, 0.1)",
        "strong" => "0 10px 25px rgba(0, 0, 0, 0.15)",
        _ => "0 4px 6px rgba(0, 0, 0, 0.1)",
    }
}

fn speed_value(speed: &str) -> &'static str {
    match speed {
        "none" => "0ms",
        "fast" => "150ms",
        "slow" => "500ms",
        _ => "300ms",
    }
}

// ─── Section rules ──────────────────────────────────────────────────────────

/// Emit the layout rules for one section, breakpoint overrides included.
///
/// The base rule carries the full desktop layout; each `@media` block
/// re-declares only the properties its override sets, so the cascade
/// does the merging.
#[must_use]
pub fn section_css(section: &Section) -> String {
    let selector = format!(
        r#"[data-section-id="{}"] > .gmkb-section__inner"#,
        section.id
    );
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "{selector} {{");
    layout_rules(&mut out, &section.layout, 1);
    background_rules(&mut out, &section.options, 1);
    out.push_str("}\n");

    emit_breakpoint(&mut out, &selector, TABLET_MAX_WIDTH, &section.responsive.tablet);
    emit_breakpoint(&mut out, &selector, MOBILE_MAX_WIDTH, &section.responsive.mobile);
    out
}

fn emit_breakpoint(out: &mut String, selector: &str, max_width: &str, patch: &LayoutPatch) {
    if patch.is_empty() {
        return;
    }
    let _ = writeln!(out, "@media (max-width: {max_width}) {{");
    let _ = writeln!(out, "  {selector} {{");
    patch_rules(out, patch, 2);
    out.push_str("  }\n}\n");
}

fn patch_rules(out: &mut String, patch: &LayoutPatch, depth: usize) {
    let pad = "  ".repeat(depth);
    if let Some(ref padding) = patch.padding {
        let _ = writeln!(out, "{pad}padding: {padding};");
    }
    if let Some(ref min_height) = patch.min_height {
        let _ = writeln!(out, "{pad}min-height: {min_height};");
    }
    match (patch.columns, &patch.grid_template_columns) {
        (_, Some(template)) => {
            let _ = writeln!(out, "{pad}grid-template-columns: {template};");
        }
        (Some(columns), None) => {
            let _ = writeln!(
                out,
                "{pad}grid-template-columns: repeat({}, 1fr);",
                columns.max(1)
            );
        }
        (None, None) => {}
    }
    if let Some(ref gap) = patch.column_gap {
        let _ = writeln!(out, "{pad}column-gap: {gap};");
    }
}

fn layout_rules(out: &mut String, layout: &SectionLayout, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(out, "{pad}max-width: {};", layout.max_width);
    let _ = writeln!(out, "{pad}padding: {};", layout.padding);
    if let Some(ref min_height) = layout.min_height {
        let _ = writeln!(out, "{pad}min-height: {min_height};");
    }

    if let Some(ref display) = layout.display {
        let _ = writeln!(out, "{pad}display: {display};");
        if display == "flex" {
            if let Some(ref align) = layout.align_items {
                let _ = writeln!(out, "{pad}align-items: {align};");
            }
            if let Some(ref justify) = layout.justify_content {
                let _ = writeln!(out, "{pad}justify-content: {justify};");
            }
        }
        if display == "grid" {
            if let Some(ref template) = layout.grid_template_columns {
                let _ = writeln!(out, "{pad}grid-template-columns: {template};");
            }
            let _ = writeln!(out, "{pad}column-gap: {};", layout.column_gap);
            if let Some(ref row_gap) = layout.row_gap {
                let _ = writeln!(out, "{pad}row-gap: {row_gap};");
            }
        }
    }

    // Plain multi-column sections become a grid: the explicit template
    // when one is set (sidebar's 2fr 1fr), an even split otherwise.
    if layout.columns > 1 && layout.display.as_deref() != Some("grid") {
        let _ = writeln!(out, "{pad}display: grid;");
        match layout.grid_template_columns {
            Some(ref template) => {
                let _ = writeln!(out, "{pad}grid-template-columns: {template};");
            }
            None => {
                let _ = writeln!(
                    out,
                    "{pad}grid-template-columns: repeat({}, 1fr);",
                    layout.columns
                );
            }
        }
        let _ = writeln!(out, "{pad}column-gap: {};", layout.column_gap);
    }
}

fn background_rules(out: &mut String, options: &SectionOptions, depth: usize) {
    let pad = "  ".repeat(depth);
    match options.background_type.as_str() {
        "color" => {
            let _ = writeln!(out, "{pad}background-color: {};", options.background_color);
        }
        "gradient" => {
            let color = if options.background_color.is_empty() {
                "#295cff"
            } else {
                &options.background_color
            };
            let _ = writeln!(
                out,
                "{pad}background: linear-gradient(135deg, {color}, {});",
                lighten_color(color, 0.2)
            );
        }
        _ => {}
    }
}

/// Lighten a `#rrggbb` color by shifting each channel toward white.
/// Anything that does not parse is returned unchanged.
fn lighten_color(color: &str, amount: f32) -> String {
    let hex = color.trim_start_matches('#');
    if hex.len() != 6 {
        return color.to_string();
    }
    let Ok(num) = u32::from_str_radix(hex, 16) else {
        return color.to_string();
    };
    let add = (amount * 255.0).round() as i32;
    let r = (((num >> 16) & 0xff) as i32 + add).clamp(0, 255);
    let g = (((num >> 8) & 0xff) as i32 + add).clamp(0, 255);
    let b = ((num & 0xff) as i32 + add).clamp(0, 255);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn format_num(n: f32) -> String {
    if n == n.floor() {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
