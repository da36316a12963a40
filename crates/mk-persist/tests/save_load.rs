//! Integration tests: the persistence cycle against a mock WordPress
//! endpoint (mk-persist).
//!
//! The mock speaks the same envelope as `admin-ajax.php`: form-encoded
//! POSTs, `{ success, data }` responses, string rejections. Each test
//! spins up its own server on an ephemeral port.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use mk_core::model::{MediaKitState, PropMap, SectionKind};
use mk_core::registry::ComponentRegistry;
use mk_editor::DocumentStore;
use mk_persist::{
    AjaxClient, Autosaver, EditorEvent, MemorySnapshotStore, PersistError, PersistService,
    note_dispatch,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const GOOD_NONCE: &str = "test-nonce-1234";
const POST_ID: u64 = 42;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── Mock endpoint ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MockWordPress {
    saved: Arc<Mutex<Option<Value>>>,
    raw_saves: Arc<Mutex<Vec<String>>>,
}

#[derive(Deserialize)]
struct AjaxForm {
    action: String,
    nonce: String,
    post_id: u64,
    #[serde(default)]
    state: Option<String>,
}

async fn admin_ajax(State(wp): State<MockWordPress>, Form(form): Form<AjaxForm>) -> Response {
    if form.nonce == "force-403" {
        return (StatusCode::FORBIDDEN, "-1").into_response();
    }
    if form.nonce != GOOD_NONCE {
        return Json(json!({ "success": false, "data": "Invalid nonce" })).into_response();
    }
    match form.action.as_str() {
        "gmkb_save_media_kit" => {
            let Some(raw) = form.state else {
                return Json(json!({ "success": false, "data": "No state data provided" }))
                    .into_response();
            };
            let Ok(blob) = serde_json::from_str::<Value>(&raw) else {
                return Json(json!({ "success": false, "data": "Invalid JSON data" }))
                    .into_response();
            };
            let components_count = blob
                .get("components")
                .and_then(Value::as_object)
                .map_or(0, |m| m.len());
            let sections_count = blob
                .get("sections")
                .and_then(Value::as_array)
                .map_or(0, |a| a.len());
            wp.raw_saves.lock().unwrap().push(raw);
            *wp.saved.lock().unwrap() = Some(blob);
            Json(json!({
                "success": true,
                "data": {
                    "message": "Media kit saved successfully",
                    "timestamp": 1_724_204_800u64,
                    "post_id": form.post_id,
                    "components_count": components_count,
                    "sections_count": sections_count,
                    "save_method": "database"
                }
            }))
            .into_response()
        }
        "gmkb_load_media_kit" => {
            let saved = wp.saved.lock().unwrap().clone();
            match saved {
                Some(state) => {
                    let components_loaded = state
                        .get("components")
                        .and_then(Value::as_object)
                        .map_or(0, |m| m.len());
                    Json(json!({
                        "success": true,
                        "data": {
                            "state": state,
                            "components_loaded": components_loaded,
                            "message": format!("Loaded {components_loaded} components")
                        }
                    }))
                    .into_response()
                }
                None => Json(json!({
                    "success": true,
                    "data": { "state": null, "message": "No saved state found" }
                }))
                .into_response(),
            }
        }
        _ => Json(json!({ "success": false, "data": "Unknown action" })).into_response(),
    }
}

async fn spawn_server() -> (String, MockWordPress) {
    let wp = MockWordPress::default();
    let app = Router::new()
        .route("/wp-admin/admin-ajax.php", post(admin_ajax))
        .with_state(wp.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/wp-admin/admin-ajax.php"), wp)
}

fn make_service(endpoint: &str, nonce: &str) -> PersistService {
    let client = AjaxClient::new(endpoint, nonce).unwrap();
    PersistService::new(client, Box::new(MemorySnapshotStore::new()), POST_ID)
}

fn make_store() -> DocumentStore {
    DocumentStore::new(ComponentRegistry::with_builtins())
}

/// A store with a hero in a section and a free-floating biography.
fn populated_store() -> DocumentStore {
    let mut store = make_store();
    let hero = store.add_component("hero", PropMap::new(), None).unwrap();
    store.add_component("biography", PropMap::new(), None).unwrap();
    let section = store.register_section_auto(SectionKind::FullWidth).unwrap();
    store
        .assign_component_to_section(hero, section, 1, None)
        .unwrap();
    store
}

// ─── Save and load ──────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_load_round_trips_the_document() {
    init_logging();
    let (endpoint, _wp) = spawn_server().await;
    let mut service = make_service(&endpoint, GOOD_NONCE);
    let mut store = populated_store();
    let mut events = service.subscribe();

    let receipt = service.save(&mut store).await.unwrap();
    assert_eq!(receipt.post_id, POST_ID);
    assert_eq!(receipt.components_count, 2);
    assert!(!store.is_dirty(), "confirmed save marks the store clean");
    assert_eq!(
        events.try_recv().unwrap(),
        EditorEvent::Saved { components_count: 2 }
    );

    let loaded = service.load(POST_ID).await.unwrap();
    assert_eq!(&loaded, store.state());
    assert_eq!(events.try_recv().unwrap(), EditorEvent::Loaded);
}

#[tokio::test]
async fn load_of_a_fresh_post_yields_the_default_document() {
    init_logging();
    let (endpoint, _wp) = spawn_server().await;
    let service = make_service(&endpoint, GOOD_NONCE);

    let loaded = service.load(POST_ID).await.unwrap();
    assert_eq!(loaded, MediaKitState::default());
}

#[tokio::test]
async fn unchanged_document_posts_identical_json() {
    init_logging();
    let (endpoint, wp) = spawn_server().await;
    let mut service = make_service(&endpoint, GOOD_NONCE);
    let mut store = populated_store();

    service.save(&mut store).await.unwrap();
    service.save(&mut store).await.unwrap();

    let raw_saves = wp.raw_saves.lock().unwrap();
    assert_eq!(raw_saves.len(), 2);
    assert_eq!(raw_saves[0], raw_saves[1]);
}

// ─── Failure paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn stale_nonce_rejection_keeps_work_recoverable() {
    init_logging();
    let (endpoint, wp) = spawn_server().await;
    let mut service = make_service(&endpoint, "expired-nonce");
    let mut store = populated_store();
    let mut events = service.subscribe();

    let err = service.save(&mut store).await.unwrap_err();
    assert!(matches!(err, PersistError::NonceRejected));
    assert!(store.is_dirty(), "a failed save leaves the store dirty");
    assert!(wp.saved.lock().unwrap().is_none());
    assert!(matches!(
        events.try_recv().unwrap(),
        EditorEvent::SaveFailed { .. }
    ));

    // The mirror was written before the POST, so the work is recoverable.
    let recovered = service.recover_backup().unwrap();
    assert_eq!(recovered.components.len(), 2);
}

#[tokio::test]
async fn forbidden_status_maps_to_nonce_rejection() {
    init_logging();
    let (endpoint, _wp) = spawn_server().await;
    let mut service = make_service(&endpoint, "force-403");
    let mut store = populated_store();

    let err = service.save(&mut store).await.unwrap_err();
    assert!(matches!(err, PersistError::NonceRejected));
}

// ─── Lifecycle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_fetches_when_nothing_is_injected() {
    init_logging();
    let (endpoint, _wp) = spawn_server().await;

    let mut first = make_service(&endpoint, GOOD_NONCE);
    let mut authoring = populated_store();
    first.save(&mut authoring).await.unwrap();

    let mut service = make_service(&endpoint, GOOD_NONCE);
    let mut store = make_store();
    let mut events = service.subscribe();
    service.initialize(&mut store, None).await.unwrap();

    assert_eq!(store.state(), authoring.state());
    assert!(!store.is_dirty());
    assert_eq!(events.try_recv().unwrap(), EditorEvent::Loaded);
    assert_eq!(events.try_recv().unwrap(), EditorEvent::Ready);
}

#[tokio::test]
async fn autosave_cycle_saves_after_the_quiet_window() {
    init_logging();
    let (endpoint, wp) = spawn_server().await;
    let mut service = make_service(&endpoint, GOOD_NONCE);
    let mut store = make_store();

    let (tx, rx) = watch::channel(store.revision());
    let mut autosaver = Autosaver::with_debounce(rx, Duration::from_millis(50));

    store.add_component("hero", PropMap::new(), None).unwrap();
    note_dispatch(&tx, &store);

    let settled = autosaver.settled().await;
    assert_eq!(settled, Some(store.revision()));

    service.save(&mut store).await.unwrap();
    assert!(!store.is_dirty());
    assert!(wp.saved.lock().unwrap().is_some());
}
