//! HTML projection: document state → markup string.
//!
//! Rendering is a pure function of the state and the options passed in.
//! Controls and selection highlights are re-derived on every call, so
//! there is nothing to preserve across renders; the embedding shell swaps
//! subtrees keyed by the stable `data-component-id` / `data-section-id`
//! attributes.

use mk_core::id::ComponentId;
use mk_core::model::{Component, MediaKitState, PropMap, Section, SectionKind};
use mk_core::{ComponentRegistry, ThemeSet};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::Arc;

use crate::css;

/// Per-render switches. Defaults match the builder canvas; use
/// [`RenderOptions::frontend`] for the public, chrome-free page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub controls: bool,
    pub selected: Option<ComponentId>,
    pub hovered: Option<ComponentId>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            controls: true,
            selected: None,
            hovered: None,
        }
    }
}

impl RenderOptions {
    /// No controls, no highlights: what site visitors see.
    pub fn frontend() -> Self {
        Self {
            controls: false,
            selected: None,
            hovered: None,
        }
    }
}

/// Stateless renderer; holds the catalogs markup generation reads from.
pub struct Renderer {
    registry: Arc<ComponentRegistry>,
    themes: ThemeSet,
}

impl Renderer {
    pub fn new(registry: Arc<ComponentRegistry>, themes: ThemeSet) -> Self {
        Self { registry, themes }
    }

    /// Render the whole document. Sections render in order when any of
    /// them holds a component; otherwise the flat `layout` order is used.
    #[must_use]
    pub fn render_document(&self, state: &MediaKitState, opts: &RenderOptions) -> String {
        let mut out = String::with_capacity(4096);
        let theme = escape_html(&state.theme);
        let _ = writeln!(
            out,
            r#"<div class="gmkb-preview theme-{theme}" data-gmkb-theme="{theme}">"#
        );

        if state.is_empty() {
            emit_empty_state(&mut out, 1);
        } else if state.has_populated_sections() {
            for section in &state.sections {
                self.emit_section(&mut out, state, section, opts, 1);
            }
            // Components no section claims still render, after the rows.
            let placed: BTreeSet<ComponentId> = state
                .sections
                .iter()
                .flat_map(|s| s.placements.iter().map(|p| p.component))
                .collect();
            for id in &state.layout {
                if placed.contains(id) {
                    continue;
                }
                match state.components.get(id) {
                    Some(component) => self.emit_component(&mut out, component, opts, 1),
                    None => log::warn!("layout references missing component '{id}'"),
                }
            }
        } else {
            for id in &state.layout {
                match state.components.get(id) {
                    Some(component) => self.emit_component(&mut out, component, opts, 1),
                    None => log::warn!("layout references missing component '{id}'"),
                }
            }
        }

        out.push_str("</div>\n");
        out
    }

    /// Render one section subtree, for targeted re-rendering.
    #[must_use]
    pub fn render_section(
        &self,
        state: &MediaKitState,
        section: &Section,
        opts: &RenderOptions,
    ) -> String {
        let mut out = String::new();
        self.emit_section(&mut out, state, section, opts, 0);
        out
    }

    /// Render one component subtree, for targeted re-rendering.
    #[must_use]
    pub fn render_component(&self, component: &Component, opts: &RenderOptions) -> String {
        let mut out = String::new();
        self.emit_component(&mut out, component, opts, 0);
        out
    }

    /// The stylesheet that accompanies [`Renderer::render_document`]:
    /// theme variables plus the per-section layout rules.
    #[must_use]
    pub fn stylesheet(&self, state: &MediaKitState) -> String {
        let theme = self.themes.get(&state.theme);
        let mut out = css::theme_css(theme, &state.theme_customizations);
        for section in &state.sections {
            out.push('\n');
            out.push_str(&css::section_css(section));
        }
        out
    }

    fn emit_section(
        &self,
        out: &mut String,
        state: &MediaKitState,
        section: &Section,
        opts: &RenderOptions,
        depth: usize,
    ) {
        let kind = section.kind.as_str();
        let id = escape_html(section.id.as_str());

        indent(out, depth);
        let _ = writeln!(
            out,
            r#"<section id="section-{id}" class="gmkb-section gmkb-section--{kind}" data-section-id="{id}" data-section-type="{kind}">"#
        );

        if opts.controls {
            emit_section_controls(out, depth + 1);
        }

        if section.column_count() == 1 {
            indent(out, depth + 1);
            let _ = writeln!(
                out,
                r#"<div class="gmkb-section__inner gmkb-section__content" data-section-id="{id}" data-column="1">"#
            );
            if section.placements.is_empty() {
                emit_empty_section(out, depth + 2);
            } else {
                for component_id in section.components_in_order() {
                    if let Some(component) = state.components.get(&component_id) {
                        self.emit_component(out, component, opts, depth + 2);
                    }
                }
            }
            indent(out, depth + 1);
            out.push_str("</div>\n");
        } else {
            indent(out, depth + 1);
            out.push_str("<div class=\"gmkb-section__inner\">\n");
            for column in 1..=section.column_count() {
                indent(out, depth + 2);
                let role = column_role(section.kind, column);
                let _ = writeln!(
                    out,
                    r#"<div class="gmkb-section__column gmkb-section__column--{column}{role}" data-section-id="{id}" data-column="{column}">"#
                );
                for component_id in section.column_components(column) {
                    if let Some(component) = state.components.get(&component_id) {
                        self.emit_component(out, component, opts, depth + 3);
                    }
                }
                indent(out, depth + 2);
                out.push_str("</div>\n");
            }
            indent(out, depth + 1);
            out.push_str("</div>\n");
        }

        indent(out, depth);
        out.push_str("</section>\n");
    }

    fn emit_component(
        &self,
        out: &mut String,
        component: &Component,
        opts: &RenderOptions,
        depth: usize,
    ) {
        let kind = escape_html(&component.kind);
        let id = escape_html(component.id.as_str());
        let known = self.registry.has(&component.kind);

        indent(out, depth);
        let _ = write!(out, r#"<div class="gmkb-component gmkb-component--{kind}"#);
        if !known {
            out.push_str(" gmkb-component--fallback");
        }
        if opts.selected == Some(component.id) {
            out.push_str(" is-selected");
        }
        if opts.hovered == Some(component.id) {
            out.push_str(" is-hovered");
        }
        let _ = writeln!(
            out,
            r#"" data-component-id="{id}" data-component-type="{kind}">"#
        );

        if opts.controls {
            emit_component_controls(out, depth + 1);
        }

        indent(out, depth + 1);
        out.push_str("<div class=\"gmkb-component__content\">\n");
        if known {
            self.emit_component_body(out, component, depth + 2);
        } else {
            emit_fallback_body(out, component, depth + 2);
        }
        indent(out, depth + 1);
        out.push_str("</div>\n");

        indent(out, depth);
        out.push_str("</div>\n");
    }

    fn emit_component_body(&self, out: &mut String, component: &Component, depth: usize) {
        let props = &component.props;
        match component.kind.as_str() {
            "hero" => {
                emit_prop_tag(out, props, "title", "h1", "gmkb-hero__title", depth);
                emit_prop_tag(out, props, "subtitle", "p", "gmkb-hero__subtitle", depth);
                emit_prop_tag(out, props, "description", "p", "gmkb-hero__description", depth);
            }
            "biography" => {
                emit_prop_tag(out, props, "name", "h2", "gmkb-biography__name", depth);
                emit_prop_tag(out, props, "title", "h3", "gmkb-biography__title", depth);
                emit_prop_tag(out, props, "bio", "p", "gmkb-biography__text", depth);
            }
            "topics" => {
                emit_prop_tag(out, props, "title", "h3", "gmkb-topics__title", depth);
                if let Some(topics) = props.get("topics").and_then(|v| v.as_array()) {
                    indent(out, depth);
                    out.push_str("<ul class=\"gmkb-topics__list\">\n");
                    for topic in topics.iter().filter_map(|v| v.as_str()) {
                        indent(out, depth + 1);
                        let _ = writeln!(out, "<li>{}</li>", escape_html(topic));
                    }
                    indent(out, depth);
                    out.push_str("</ul>\n");
                }
            }
            "contact" => {
                if let Some(email) = prop_str(props, "email") {
                    indent(out, depth);
                    let email = escape_html(email);
                    let _ = writeln!(
                        out,
                        r#"<a class="gmkb-contact__email" href="mailto:{email}">{email}</a>"#
                    );
                }
                emit_prop_tag(out, props, "phone", "p", "gmkb-contact__phone", depth);
                emit_prop_tag(out, props, "website", "p", "gmkb-contact__website", depth);
            }
            _ => {
                // The rest of the catalog renders a labelled shell; their
                // full bodies live in kind-specific front-end templates.
                let definition = self.registry.get(&component.kind);
                indent(out, depth);
                let _ = writeln!(out, "<h4>{}</h4>", escape_html(&definition.name));
                emit_prop_tag(out, props, "title", "p", "gmkb-component__title", depth);
            }
        }
    }
}

// ─── Markup helpers ─────────────────────────────────────────────────────────

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Escape text for HTML body or attribute position.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn prop_str<'a>(props: &'a PropMap, key: &str) -> Option<&'a str> {
    props.get(key).and_then(|v| v.as_str())
}

/// `<tag class="class">{escaped prop}</tag>` when the prop is present.
fn emit_prop_tag(
    out: &mut String,
    props: &PropMap,
    key: &str,
    tag: &str,
    class: &str,
    depth: usize,
) {
    if let Some(text) = prop_str(props, key) {
        indent(out, depth);
        let _ = writeln!(out, r#"<{tag} class="{class}">{}</{tag}>"#, escape_html(text));
    }
}

fn column_role(kind: SectionKind, column: u8) -> &'static str {
    if kind != SectionKind::Sidebar {
        return "";
    }
    if column == 1 {
        " gmkb-section__column--main"
    } else {
        " gmkb-section__column--sidebar"
    }
}

fn emit_component_controls(out: &mut String, depth: usize) {
    indent(out, depth);
    out.push_str("<div class=\"gmkb-component__controls\">\n");
    for (action, title, glyph) in [
        ("move-up", "Move Up", "↑"),
        ("move-down", "Move Down", "↓"),
        ("edit", "Edit", "✎"),
        ("duplicate", "Duplicate", "⧉"),
        ("delete", "Delete", "✕"),
    ] {
        indent(out, depth + 1);
        let _ = writeln!(
            out,
            r#"<button class="gmkb-control" data-action="{action}" title="{title}">{glyph}</button>"#
        );
    }
    indent(out, depth);
    out.push_str("</div>\n");
}

fn emit_section_controls(out: &mut String, depth: usize) {
    indent(out, depth);
    out.push_str("<div class=\"gmkb-section__controls\">\n");
    for (action, title, glyph) in [
        ("settings", "Section Settings", "⚙"),
        ("delete-section", "Delete Section", "✕"),
    ] {
        indent(out, depth + 1);
        let _ = writeln!(
            out,
            r#"<button class="gmkb-control" data-action="{action}" title="{title}">{glyph}</button>"#
        );
    }
    indent(out, depth);
    out.push_str("</div>\n");
}

fn emit_empty_state(out: &mut String, depth: usize) {
    indent(out, depth);
    out.push_str("<div class=\"gmkb-empty-state\">\n");
    indent(out, depth + 1);
    out.push_str("<h3>No components yet</h3>\n");
    indent(out, depth + 1);
    out.push_str(
        "<button class=\"gmkb-control\" data-action=\"add-component\">Add Component</button>\n",
    );
    indent(out, depth);
    out.push_str("</div>\n");
}

fn emit_empty_section(out: &mut String, depth: usize) {
    indent(out, depth);
    out.push_str("<div class=\"gmkb-section__empty\">\n");
    indent(out, depth + 1);
    out.push_str("<div class=\"gmkb-section__empty-text\">Drop components here or click to add</div>\n");
    indent(out, depth);
    out.push_str("</div>\n");
}

fn emit_fallback_body(out: &mut String, component: &Component, depth: usize) {
    indent(out, depth);
    out.push_str("<div class=\"component-fallback\">\n");
    indent(out, depth + 1);
    let _ = writeln!(out, "<h4>{}</h4>", escape_html(&component.kind));
    indent(out, depth + 1);
    let _ = writeln!(
        out,
        "<p>Component ID: {}</p>",
        escape_html(component.id.as_str())
    );
    indent(out, depth);
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use mk_core::id::SectionId;
    use serde_json::json;

    fn renderer() -> Renderer {
        Renderer::new(
            Arc::new(ComponentRegistry::with_builtins()),
            ThemeSet::builtin(),
        )
    }

    fn component(kind: &str, id: &str) -> Component {
        Component::with_id(ComponentId::intern(id), kind)
    }

    #[test]
    fn empty_document_renders_the_empty_state() {
        let html = renderer().render_document(&MediaKitState::default(), &RenderOptions::default());
        assert!(html.contains("gmkb-empty-state"));
        assert!(html.contains("No components yet"));
        assert!(html.contains(r#"data-action="add-component""#));
        assert!(html.contains(r#"data-gmkb-theme="professional""#));
    }

    #[test]
    fn flat_mode_renders_layout_order() {
        let mut state = MediaKitState::default();
        let a = component("hero", "hero-1");
        let b = component("topics", "topics-1");
        state.layout = vec![a.id, b.id];
        state.components.insert(a.id, a);
        state.components.insert(b.id, b);

        let html = renderer().render_document(&state, &RenderOptions::default());
        let hero_at = html.find(r#"data-component-id="hero-1""#).unwrap();
        let topics_at = html.find(r#"data-component-id="topics-1""#).unwrap();
        assert!(hero_at < topics_at);
        assert!(!html.contains("gmkb-empty-state"));
    }

    #[test]
    fn prop_text_is_escaped() {
        let mut state = MediaKitState::default();
        let mut hero = component("hero", "hero-1");
        hero.props
            .insert("title".to_string(), json!("<script>alert(1)</script>"));
        state.layout = vec![hero.id];
        state.components.insert(hero.id, hero);

        let html = renderer().render_document(&state, &RenderOptions::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn unknown_kind_gets_the_fallback_body() {
        let mut state = MediaKitState::default();
        let odd = component("hologram", "hologram-1");
        state.layout = vec![odd.id];
        state.components.insert(odd.id, odd);

        let html = renderer().render_document(&state, &RenderOptions::default());
        assert!(html.contains("gmkb-component--fallback"));
        assert!(html.contains("component-fallback"));
        assert!(html.contains("Component ID: hologram-1"));
    }

    #[test]
    fn selection_and_hover_become_classes() {
        let hero = component("hero", "hero-1");
        let opts = RenderOptions {
            controls: true,
            selected: Some(hero.id),
            hovered: Some(hero.id),
        };
        let html = renderer().render_component(&hero, &opts);
        assert!(html.contains("is-selected"));
        assert!(html.contains("is-hovered"));

        let plain = renderer().render_component(&hero, &RenderOptions::default());
        assert!(!plain.contains("is-selected"));
        assert!(!plain.contains("is-hovered"));
    }

    #[test]
    fn frontend_options_omit_all_chrome() {
        let hero = component("hero", "hero-1");
        let html = renderer().render_component(&hero, &RenderOptions::frontend());
        assert!(!html.contains("gmkb-component__controls"));
        assert!(!html.contains("data-action"));
    }

    #[test]
    fn sidebar_columns_carry_role_classes() {
        let mut state = MediaKitState::default();
        let mut section = Section::new(SectionId::intern("s1"), SectionKind::Sidebar);
        let main = component("biography", "bio-1");
        let aside = component("contact", "contact-1");
        state.layout = vec![main.id, aside.id];
        section.place(main.id, 1, None);
        section.place(aside.id, 2, None);
        state.components.insert(main.id, main);
        state.components.insert(aside.id, aside);
        state.sections.push(section);

        let html = renderer().render_document(&state, &RenderOptions::default());
        assert!(html.contains("gmkb-section__column--main"));
        assert!(html.contains("gmkb-section__column--sidebar"));
        assert!(html.contains(r#"data-section-type="sidebar""#));
    }

    #[test]
    fn empty_single_column_section_gets_a_placeholder() {
        let mut state = MediaKitState::default();
        state
            .sections
            .push(Section::new(SectionId::intern("s1"), SectionKind::FullWidth));
        let hero = component("hero", "hero-1");
        state.layout = vec![hero.id];
        state.components.insert(hero.id, hero);

        // Section exists but nothing is placed: flat mode, so the section
        // is not rendered at all.
        let renderer = renderer();
        let html = renderer.render_document(&state, &RenderOptions::default());
        assert!(!html.contains("gmkb-section"));

        // Rendered directly, the empty section shows its drop target.
        let section_html = renderer.render_section(
            &state,
            &state.sections[0],
            &RenderOptions::default(),
        );
        assert!(section_html.contains("gmkb-section__empty"));
        assert!(section_html.contains("Drop components here"));
    }
}
