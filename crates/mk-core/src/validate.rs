//! Consistency checks over a document.
//!
//! These never mutate: the load path already repairs what it can, so the
//! checks here exist to surface anything still off after editing, one rule
//! per function. Warnings are real inconsistencies; infos are conditions
//! the render path tolerates.

use crate::model::MediaKitState;
use crate::registry::ComponentRegistry;
use crate::theme::theme_by_id;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The component, section or document field the finding is about.
    pub subject: String,
    pub message: String,
    pub severity: Severity,
    pub rule: &'static str,
}

/// Run every check and collect findings.
pub fn validate_state(state: &MediaKitState, registry: &ComponentRegistry) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    check_layout_refs(state, &mut diags);
    check_layout_coverage(state, &mut diags);
    check_placement_refs(state, &mut diags);
    check_placement_uniqueness(state, &mut diags);
    check_placement_columns(state, &mut diags);
    check_component_kinds(state, registry, &mut diags);
    check_theme(state, &mut diags);
    check_sectioned_coverage(state, &mut diags);
    diags
}

/// True when no finding is at warning level.
pub fn is_consistent(state: &MediaKitState, registry: &ComponentRegistry) -> bool {
    validate_state(state, registry)
        .iter()
        .all(|d| d.severity != Severity::Warning)
}

fn check_layout_refs(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    let mut seen = BTreeMap::new();
    for id in &state.layout {
        if !state.components.contains_key(id) {
            out.push(Diagnostic {
                subject: id.to_string(),
                message: format!("layout references missing component '{id}'"),
                severity: Severity::Warning,
                rule: "dangling-layout-ref",
            });
        }
        let count = seen.entry(*id).or_insert(0usize);
        *count += 1;
        if *count == 2 {
            out.push(Diagnostic {
                subject: id.to_string(),
                message: format!("component '{id}' appears more than once in layout"),
                severity: Severity::Warning,
                rule: "duplicate-layout-entry",
            });
        }
    }
}

fn check_layout_coverage(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    for id in state.components.keys() {
        if !state.layout.contains(id) {
            out.push(Diagnostic {
                subject: id.to_string(),
                message: format!("component '{id}' is missing from layout"),
                severity: Severity::Warning,
                rule: "missing-layout-entry",
            });
        }
    }
}

fn check_placement_refs(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    for section in &state.sections {
        for placement in &section.placements {
            if !state.components.contains_key(&placement.component) {
                out.push(Diagnostic {
                    subject: section.id.to_string(),
                    message: format!(
                        "section '{}' places missing component '{}'",
                        section.id, placement.component
                    ),
                    severity: Severity::Warning,
                    rule: "dangling-placement",
                });
            }
        }
    }
}

fn check_placement_uniqueness(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    let mut counts: BTreeMap<_, usize> = BTreeMap::new();
    for section in &state.sections {
        for placement in &section.placements {
            *counts.entry(placement.component).or_insert(0) += 1;
        }
    }
    for (component, count) in counts {
        if count > 1 {
            out.push(Diagnostic {
                subject: component.to_string(),
                message: format!("component '{component}' is placed {count} times"),
                severity: Severity::Warning,
                rule: "duplicate-placement",
            });
        }
    }
}

fn check_placement_columns(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    for section in &state.sections {
        let columns = section.column_count();
        for placement in &section.placements {
            if placement.column < 1 || placement.column > columns {
                out.push(Diagnostic {
                    subject: section.id.to_string(),
                    message: format!(
                        "placement of '{}' uses column {} of a {columns}-column section",
                        placement.component, placement.column
                    ),
                    severity: Severity::Warning,
                    rule: "column-out-of-range",
                });
            }
        }
    }
}

fn check_component_kinds(
    state: &MediaKitState,
    registry: &ComponentRegistry,
    out: &mut Vec<Diagnostic>,
) {
    for component in state.components.values() {
        if !registry.has(&component.kind) {
            out.push(Diagnostic {
                subject: component.id.to_string(),
                message: format!(
                    "component '{}' has unregistered kind '{}'",
                    component.id, component.kind
                ),
                severity: Severity::Info,
                rule: "unknown-component-kind",
            });
        }
    }
}

fn check_theme(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    if theme_by_id(&state.theme).is_none() {
        out.push(Diagnostic {
            subject: "theme".to_string(),
            message: format!("theme '{}' is not in the catalog", state.theme),
            severity: Severity::Info,
            rule: "unknown-theme",
        });
    }
}

fn check_sectioned_coverage(state: &MediaKitState, out: &mut Vec<Diagnostic>) {
    if !state.has_populated_sections() {
        return;
    }
    for id in state.components.keys() {
        if state.placement_of(*id).is_none() {
            out.push(Diagnostic {
                subject: id.to_string(),
                message: format!(
                    "component '{id}' is not placed in any section and will render last"
                ),
                severity: Severity::Info,
                rule: "unsectioned-component",
            });
        }
    }
}
