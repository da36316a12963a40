//! Integration tests: dispatch through the document store (mk-editor).
//!
//! Exercises the validate-then-mutate contract: accepted actions change
//! the document and notify subscribers, rejected actions change nothing
//! at all.

use mk_core::model::{MediaKitState, PropMap, SectionKind};
use mk_core::{ComponentRegistry, SectionId};
use mk_editor::{Action, ActionError, DocumentStore, TargetPlacement};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn make_store() -> DocumentStore {
    DocumentStore::new(ComponentRegistry::with_builtins())
}

// ─── Accept path ────────────────────────────────────────────────────────

#[test]
fn add_component_lands_in_map_and_layout() {
    let mut store = make_store();
    let mut props = PropMap::new();
    props.insert("title".to_string(), json!("Dana Reyes"));
    let id = store.add_component("hero", props, None).unwrap();

    let state = store.state();
    assert_eq!(state.components.len(), 1);
    assert_eq!(state.components[&id].kind, "hero");
    assert_eq!(state.layout, vec![id]);
    assert_eq!(state.components[&id].props["title"], json!("Dana Reyes"));
}

#[test]
fn add_with_placement_lands_in_the_section_too() {
    let mut store = make_store();
    let section = SectionId::intern("hero-row");
    store.register_section(section, SectionKind::Hero).unwrap();

    let id = store
        .add_component(
            "hero",
            PropMap::new(),
            Some(TargetPlacement {
                section,
                column: 1,
                index: None,
            }),
        )
        .unwrap();

    assert_eq!(store.state().placement_of(id), Some((section, 1)));
    assert!(store.state().layout.contains(&id));
}

#[test]
fn remove_component_scrubs_every_structure() {
    let mut store = make_store();
    let section = SectionId::intern("s1");
    store.register_section(section, SectionKind::TwoColumn).unwrap();
    let id = store
        .add_component(
            "topics",
            PropMap::new(),
            Some(TargetPlacement {
                section,
                column: 2,
                index: None,
            }),
        )
        .unwrap();
    store.select_component(id);

    store.dispatch(Action::RemoveComponent { id }).unwrap();

    let state = store.state();
    assert!(!state.components.contains_key(&id));
    assert!(!state.layout.contains(&id));
    assert!(!state.sections[0].contains(id));
    assert_eq!(store.flags().selected, None);
}

// ─── Reject path ────────────────────────────────────────────────────────

#[test]
fn unknown_kind_is_rejected_without_side_effects() {
    let mut store = make_store();
    let err = store.add_component("carousel", PropMap::new(), None).unwrap_err();
    assert!(matches!(err, ActionError::Registry(_)));
    assert!(store.state().is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn placement_into_missing_section_rejects_the_whole_add() {
    let mut store = make_store();
    let ghost = SectionId::intern("never-registered");
    let err = store
        .add_component(
            "hero",
            PropMap::new(),
            Some(TargetPlacement {
                section: ghost,
                column: 1,
                index: None,
            }),
        )
        .unwrap_err();

    assert!(matches!(err, ActionError::MissingSection(_)));
    // Atomic: the component was not half-added.
    assert!(store.state().components.is_empty());
    assert!(store.state().layout.is_empty());
}

#[test]
fn update_of_missing_component_is_rejected() {
    let mut store = make_store();
    let ghost = mk_core::ComponentId::intern("hero-ghost");
    let mut props = PropMap::new();
    props.insert("title".to_string(), json!("x"));
    let err = store
        .dispatch(Action::UpdateComponent { id: ghost, props })
        .unwrap_err();
    assert!(matches!(err, ActionError::MissingComponent(_)));
}

#[test]
fn rejected_kind_strings_from_render_fallbacks_never_enter() {
    let mut store = make_store();
    for kind in ["unknown_type", "Unknown Component", ""] {
        assert!(store.add_component(kind, PropMap::new(), None).is_err());
    }
    assert!(store.state().is_empty());
}

// ─── Subscribers ────────────────────────────────────────────────────────

#[test]
fn subscribers_run_in_registration_order() {
    let mut store = make_store();
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    store.subscribe(move |_| first.borrow_mut().push("first"));
    let second = Rc::clone(&log);
    store.subscribe(move |_| second.borrow_mut().push("second"));

    log.borrow_mut().clear();
    store.add_component("hero", PropMap::new(), None).unwrap();
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn transient_actions_notify_but_do_not_dirty() {
    let mut store = make_store();
    let id = store.add_component("hero", PropMap::new(), None).unwrap();
    let revision = store.revision();

    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    store.subscribe(move |_| *sink.borrow_mut() += 1);
    assert_eq!(*count.borrow(), 1, "subscribe fires immediately");

    store.dispatch(Action::Select { id }).unwrap();
    store.dispatch(Action::Hover { id: Some(id) }).unwrap();
    store.dispatch(Action::Deselect).unwrap();

    assert_eq!(*count.borrow(), 4);
    assert_eq!(store.revision(), revision, "transients never bump revision");
}

// ─── Dirty tracking ─────────────────────────────────────────────────────

#[test]
fn save_confirmation_uses_the_captured_revision() {
    let mut store = make_store();
    store.add_component("hero", PropMap::new(), None).unwrap();
    let captured = store.revision();

    // An edit arrives while the save is in flight.
    store.add_component("topics", PropMap::new(), None).unwrap();
    store.mark_saved(captured);
    assert!(store.is_dirty(), "in-flight edit must keep the store dirty");

    store.mark_saved(store.revision());
    assert!(!store.is_dirty());

    // Stale confirmations cannot un-save newer work.
    store.add_component("contact", PropMap::new(), None).unwrap();
    store.mark_saved(captured);
    assert!(store.is_dirty());
}

#[test]
fn set_state_resets_flags_and_history() {
    let mut store = make_store();
    let id = store.add_component("hero", PropMap::new(), None).unwrap();
    store.select_component(id);

    let mut loaded = MediaKitState::default();
    loaded.theme = "minimal".to_string();
    store
        .dispatch(Action::SetState {
            state: Box::new(loaded.clone()),
        })
        .unwrap();

    assert_eq!(store.state(), &loaded);
    assert_eq!(store.flags().selected, None);
    assert!(!store.can_undo());
    assert!(!store.can_redo());
}
