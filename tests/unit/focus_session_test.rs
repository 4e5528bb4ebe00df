//! Integration tests for FocusSessionService.
//!
//! Each test gets its own settings file in a temp dir pointing at a mock
//! note store.

use std::sync::{Arc, Mutex};

use serde_json::json;
use smart_history::services::focus_session::{FocusSessionService, FocusSessionTrait};
use smart_history::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smart_history::types::errors::{FocusError, NoteStoreError};
use smart_history::types::settings::{FocusSession, NoteStoreSettings, Settings};
use tempfile::TempDir;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    _dir: TempDir,
    config_path: String,
    service: FocusSessionService,
}

fn fixture(note_store: NoteStoreSettings) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("settings.json").to_string_lossy().to_string();
    let settings = Settings {
        note_store,
        ..Settings::default()
    };
    std::fs::write(&config_path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

    let engine = Arc::new(Mutex::new(SettingsEngine::new(Some(config_path.clone()))));
    Fixture {
        _dir: dir,
        config_path,
        service: FocusSessionService::new(engine),
    }
}

fn store_for(server: &MockServer) -> NoteStoreSettings {
    NoteStoreSettings {
        port: server.address().port(),
        api_key: Some("vault-key".to_string()),
        ..NoteStoreSettings::default()
    }
}

fn persisted_focus(config_path: &str) -> FocusSession {
    let mut engine = SettingsEngine::new(Some(config_path.to_string()));
    engine.load().unwrap().focus
}

#[tokio::test]
async fn test_start_uses_resolved_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/simple/"))
        .and(query_param("query", "meeting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"filename": "Notes/Meeting Jan.md"}])))
        .mount(&server)
        .await;

    let fx = fixture(store_for(&server));
    let focus = fx.service.start("  meeting ").await.unwrap();
    assert_eq!(
        focus,
        FocusSession {
            active: true,
            target_note: Some("Notes/Meeting Jan.md".to_string())
        }
    );
    assert_eq!(persisted_focus(&fx.config_path), focus);
    assert_eq!(fx.service.status(), focus);
}

#[tokio::test]
async fn test_start_adds_extension_when_unresolved() {
    let server = MockServer::start().await;
    let fx = fixture(store_for(&server));
    let focus = fx.service.start("Fresh idea").await.unwrap();
    assert_eq!(focus.target_note.as_deref(), Some("Fresh idea.md"));
}

#[tokio::test]
async fn test_start_without_store_key_uses_typed_name() {
    let fx = fixture(NoteStoreSettings::default());
    let focus = fx.service.start("Offline").await.unwrap();
    assert_eq!(focus.target_note.as_deref(), Some("Offline.md"));
}

#[tokio::test]
async fn test_empty_name_is_rejected() {
    let fx = fixture(NoteStoreSettings::default());
    assert_eq!(fx.service.start("   ").await.unwrap_err(), FocusError::EmptyName);
    assert_eq!(fx.service.create_and_start("").await.unwrap_err(), FocusError::EmptyName);
    assert!(!fx.service.status().active);
}

#[tokio::test]
async fn test_create_and_start_puts_new_note() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/vault/Inbox/Reading%20List.md"))
        .and(header("Content-Type", "text/markdown"))
        .and(body_string("# Reading List\n\nCreated via Smart History Focus Mode\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = store_for(&server);
    store.default_folder = Some("Inbox".to_string());
    let fx = fixture(store);

    let focus = fx.service.create_and_start("Reading List").await.unwrap();
    assert_eq!(focus.target_note.as_deref(), Some("Inbox/Reading List.md"));
    assert_eq!(persisted_focus(&fx.config_path), focus);
}

#[tokio::test]
async fn test_create_failure_keeps_session_inactive() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&server)
        .await;

    let fx = fixture(store_for(&server));
    let err = fx.service.create_and_start("Broken").await.unwrap_err();
    assert_eq!(
        err,
        FocusError::Store(NoteStoreError::CreateFailed("500 disk full".to_string()))
    );
    assert!(!persisted_focus(&fx.config_path).active);
}

#[tokio::test]
async fn test_use_active_note() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/active/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/vault/Projects/Plan%20B.md"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vault/Projects/Plan%20B.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Plan B"))
        .mount(&server)
        .await;

    let fx = fixture(store_for(&server));
    let focus = fx.service.use_active_note().await.unwrap();
    assert_eq!(focus.target_note.as_deref(), Some("Projects/Plan B.md"));
}

#[tokio::test]
async fn test_use_active_note_without_open_note() {
    let server = MockServer::start().await;
    let fx = fixture(store_for(&server));
    let err = fx.service.use_active_note().await.unwrap_err();
    assert!(matches!(err, FocusError::Store(NoteStoreError::NoActiveNote(_))));
}

#[tokio::test]
async fn test_stop_clears_session() {
    let fx = fixture(NoteStoreSettings::default());
    fx.service.start("Topic").await.unwrap();
    assert!(fx.service.status().active);

    let focus = fx.service.stop().unwrap();
    assert_eq!(focus, FocusSession::default());
    assert_eq!(persisted_focus(&fx.config_path), FocusSession::default());
}

#[tokio::test]
async fn test_session_survives_engine_restart() {
    let fx = fixture(NoteStoreSettings::default());
    fx.service.start("Persistent").await.unwrap();

    let engine = Arc::new(Mutex::new(SettingsEngine::new(Some(fx.config_path.clone()))));
    let restarted = FocusSessionService::new(engine);
    assert_eq!(restarted.status().target_note.as_deref(), Some("Persistent.md"));
}
