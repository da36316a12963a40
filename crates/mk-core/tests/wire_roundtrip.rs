//! Integration tests: persisted blob → state → persisted blob round-trip.
//!
//! Verifies that no document data is lost crossing the serialization
//! boundary, and that legacy saved shapes normalize into the current one.

use mk_core::id::{ComponentId, SectionId};
use mk_core::model::*;
use mk_core::schema::{from_json_str, from_wire, to_json_string, to_wire};

// ─── Helpers ─────────────────────────────────────────────────────────────

fn cid(s: &str) -> ComponentId {
    ComponentId::intern(s)
}

/// Decode, re-encode, decode again, and compare the two decoded states.
fn assert_roundtrip_stable(raw: &str) {
    let state1 = from_json_str(raw).expect("first decode failed");
    let encoded = to_json_string(&state1).expect("encode failed");
    let state2 = from_json_str(&encoded).expect("re-decode failed");

    assert_eq!(
        state1, state2,
        "state changed after round-trip.\nEncoded:\n{encoded}"
    );
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_saved_kit_fixture() {
    assert_roundtrip_stable(include_str!("fixtures/saved_kit.json"));
}

#[test]
fn roundtrip_legacy_kit_fixture() {
    assert_roundtrip_stable(include_str!("fixtures/legacy_kit.json"));
}

#[test]
fn saved_kit_decodes_fully() {
    let state = from_json_str(include_str!("fixtures/saved_kit.json")).unwrap();

    assert_eq!(state.components.len(), 4);
    assert_eq!(
        state.layout,
        vec![cid("hero-1"), cid("bio-2"), cid("topics-3"), cid("contact-4")]
    );
    assert_eq!(state.sections.len(), 2);
    assert_eq!(state.theme, "creative");
    assert_eq!(
        state.theme_customizations.colors["primary"],
        serde_json::json!("#0d9488")
    );

    let hero_section = &state.sections[0];
    assert_eq!(hero_section.kind, SectionKind::Hero);
    assert_eq!(hero_section.layout.min_height.as_deref(), Some("70vh"));
    assert!(hero_section.contains(cid("hero-1")));

    let two_col = &state.sections[1];
    assert_eq!(two_col.column_components(1), vec![cid("bio-2")]);
    assert_eq!(two_col.column_components(2), vec![cid("topics-3")]);

    // contact-4 is deliberately unsectioned.
    assert_eq!(state.placement_of(cid("contact-4")), None);
}

#[test]
fn legacy_kit_normalizes() {
    let state = from_json_str(include_str!("fixtures/legacy_kit.json")).unwrap();

    // The entry without an id is dropped; the rest become the map.
    assert_eq!(state.components.len(), 2);
    assert_eq!(state.components[&cid("hero-1")].props["title"], "Legacy Kit");
    assert_eq!(state.layout, vec![cid("hero-1"), cid("bio-2")]);

    // Unknown "fullwidth" type falls back to full_width defaults.
    assert_eq!(state.sections[0].kind, SectionKind::FullWidth);
    assert!(state.sections[0].contains(cid("hero-1")));

    assert_eq!(state.global_settings.layout_mode, "vertical");
}

// ─── In-memory documents ─────────────────────────────────────────────────

fn built_state() -> MediaKitState {
    let mut state = MediaKitState::default();
    for (id, kind) in [("hero-1", "hero"), ("topics-2", "topics")] {
        let mut comp = Component::with_id(cid(id), kind);
        comp.props
            .insert("label".to_string(), serde_json::json!(kind));
        state.layout.push(comp.id);
        state.components.insert(comp.id, comp);
    }
    let mut section = Section::new(SectionId::intern("s1"), SectionKind::TwoColumn);
    section.place(cid("hero-1"), 1, None);
    section.place(cid("topics-2"), 2, None);
    state.sections.push(section);
    state.theme = "dark".to_string();
    state
}

#[test]
fn decode_of_encode_is_identity() {
    let state = built_state();
    let loaded = from_wire(to_wire(&state).unwrap()).unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn repeat_encodes_are_byte_identical() {
    let state = built_state();
    let first = to_json_string(&state).unwrap();
    let second = to_json_string(&state).unwrap();
    assert_eq!(first, second);
}

#[test]
fn encoded_hero_component_keeps_its_kind() {
    let state = built_state();
    let wire = to_wire(&state).unwrap();
    assert_eq!(wire["components"]["hero-1"]["type"], "hero");
    assert_eq!(wire["components"]["hero-1"]["sectionId"], "s1");
    assert_eq!(wire["version"], "2.0.0");
}

#[test]
fn default_document_encodes_with_empty_collections() {
    let wire = to_wire(&MediaKitState::default()).unwrap();
    assert_eq!(wire["components"], serde_json::json!({}));
    assert_eq!(wire["layout"], serde_json::json!([]));
    assert_eq!(wire["sections"], serde_json::json!([]));
    assert_eq!(wire["theme"], "professional");
    assert_eq!(wire["globalSettings"]["autoSaveInterval"], 30000);
}
