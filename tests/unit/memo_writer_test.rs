//! Integration tests for MemoWriter: target selection, context headers and
//! failure modes.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone};
use smart_history::database::Database;
use smart_history::managers::memo_context::{MemoContextTracker, MemoContextTrackerTrait};
use smart_history::services::memo_writer::{MemoOutcome, MemoRequest, MemoWriter, PageContext};
use smart_history::types::errors::{MemoError, NoteStoreError};
use smart_history::types::settings::{FocusSession, NoteStoreSettings, Settings};
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixed_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 2, 14, 5, 0)
        .unwrap()
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        note_store: NoteStoreSettings {
            port: server.address().port(),
            api_key: Some("vault-key".to_string()),
            ..NoteStoreSettings::default()
        },
        ..Settings::default()
    }
}

fn request(memo: &str, title: Option<&str>, url: Option<&str>) -> MemoRequest {
    MemoRequest {
        memo: memo.to_string(),
        path: None,
        title: title.map(str::to_string),
        url: url.map(str::to_string),
    }
}

fn writer() -> (Arc<Database>, MemoWriter) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    (db.clone(), MemoWriter::new(db))
}

#[tokio::test]
async fn test_header_only_on_context_change() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vault/Daily/2024-05-02.md"))
        .and(body_string("\n## [Rust Book](https://doc.rust-lang.org/book/)\n- 14:05 first\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vault/Daily/2024-05-02.md"))
        .and(body_string("- 14:05 second\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (_db, writer) = writer();
    let settings = settings_for(&server);
    let page = request("first", Some("Rust Book"), Some("https://doc.rust-lang.org/book/"));

    let outcome = writer.send_memo_at(&settings, &page, None, fixed_now()).await.unwrap();
    assert_eq!(
        outcome,
        MemoOutcome {
            path: "Daily/2024-05-02.md".to_string(),
            new_context: true
        }
    );

    // Same page after normalization: fragment and trailing slash differ.
    let same = request("second", Some("Rust Book"), Some("https://doc.rust-lang.org/book#ch01"));
    let outcome = writer.send_memo_at(&settings, &same, None, fixed_now()).await.unwrap();
    assert!(!outcome.new_context);
}

#[tokio::test]
async fn test_explicit_path_beats_focus_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vault/Inbox/Scratch.md"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (_db, writer) = writer();
    let mut settings = settings_for(&server);
    settings.focus = FocusSession {
        active: true,
        target_note: Some("Research/Topic.md".to_string()),
    };
    let mut memo = request("note", Some("T"), Some("https://a.test/"));
    memo.path = Some("Inbox/Scratch.md".to_string());

    let outcome = writer.send_memo_at(&settings, &memo, None, fixed_now()).await.unwrap();
    assert_eq!(outcome.path, "Inbox/Scratch.md");
}

#[tokio::test]
async fn test_focus_note_beats_daily_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vault/Research/Topic.md"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (_db, writer) = writer();
    let mut settings = settings_for(&server);
    settings.focus = FocusSession {
        active: true,
        target_note: Some("Research/Topic.md".to_string()),
    };

    let outcome = writer
        .send_memo_at(&settings, &request("note", Some("T"), Some("https://a.test/")), None, fixed_now())
        .await
        .unwrap();
    assert_eq!(outcome.path, "Research/Topic.md");
}

#[tokio::test]
async fn test_active_page_supplies_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string("\n## [Active](https://active.test/page)\n- 14:05 from tab\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (db, writer) = writer();
    let active = PageContext {
        title: "Active".to_string(),
        url: "https://active.test/page".to_string(),
    };
    writer
        .send_memo_at(&settings_for(&server), &request("from tab", None, None), Some(active), fixed_now())
        .await
        .unwrap();

    let conn = db.connection();
    assert_eq!(
        MemoContextTracker::new(&conn).last_context().unwrap(),
        Some("https://active.test/page".to_string())
    );
}

#[tokio::test]
async fn test_memo_after_archive_of_same_page_has_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string("- 14:05 follow-up\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (db, writer) = writer();
    {
        let conn = db.connection();
        MemoContextTracker::new(&conn).set_context("https://a.test/post").unwrap();
    }

    let outcome = writer
        .send_memo_at(
            &settings_for(&server),
            &request("follow-up", Some("Post"), Some("https://a.test/post/")),
            None,
            fixed_now(),
        )
        .await
        .unwrap();
    assert!(!outcome.new_context);
}

#[tokio::test]
async fn test_empty_memo_is_rejected() {
    let (_db, writer) = writer();
    let err = writer
        .send_memo_at(&Settings::default(), &request("  \n", Some("T"), Some("https://a.test")), None, fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err, MemoError::EmptyMemo);
}

#[tokio::test]
async fn test_missing_context() {
    let (_db, writer) = writer();
    let err = writer
        .send_memo_at(&Settings::default(), &request("hello", Some("Title only"), None), None, fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err, MemoError::MissingContext);
}

#[tokio::test]
async fn test_unconfigured_store_leaves_context_untouched() {
    let (db, writer) = writer();
    let err = writer
        .send_memo_at(&Settings::default(), &request("hello", Some("T"), Some("https://a.test")), None, fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoError::Store(NoteStoreError::ConfigMissing(_))));

    let conn = db.connection();
    assert_eq!(MemoContextTracker::new(&conn).last_context().unwrap(), None);
}

#[tokio::test]
async fn test_missing_note_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (_db, writer) = writer();
    let err = writer
        .send_memo_at(&settings_for(&server), &request("m", Some("T"), Some("https://a.test")), None, fixed_now())
        .await
        .unwrap_err();
    assert_eq!(err, MemoError::Store(NoteStoreError::NotFound("Daily/2024-05-02.md".to_string())));
}
