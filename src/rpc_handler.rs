//! Request dispatch for the Smart History JSON-lines protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_request` matches every [`Request`] variant; anything else fails to
//! parse in `handle_line` and is answered with an error.
//!
//! [`serve_lines`] runs every request on its own task. Responses carry the
//! request `id` and may be written in a different order than the requests
//! arrived.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::app::App;
use crate::managers::saved_urls::{SavedUrlStore, SavedUrlStoreTrait};
use crate::managers::visit_tracker::VisitTrackerTrait;
use crate::services::focus_session::FocusSessionTrait;
use crate::services::memo_writer::{MemoRequest, PageContext};
use crate::services::note_store::{NoteStoreClient, NoteStoreTrait};
use crate::services::session_orchestrator::ArchiveOutcome;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::NoteStoreError;
use crate::types::message::{Reply, Request, Response};
use crate::types::visit::ScrollSample;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn note_store(app: &App) -> Result<NoteStoreClient, NoteStoreError> {
    NoteStoreClient::from_settings(&app.settings().note_store)
}

/// Reads requests line by line until EOF, spawning one task per request.
///
/// Each response is sent on `responses` as soon as its request finishes, so a
/// request stuck on the network never delays the ones behind it.
pub async fn serve_lines<R>(app: Arc<App>, input: R, responses: UnboundedSender<Value>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let app = app.clone();
        let responses = responses.clone();
        tokio::spawn(async move {
            let response = handle_line(&app, &line).await;
            if responses.send(response).is_err() {
                debug!("response writer closed, dropping response");
            }
        });
    }
    Ok(())
}

/// Handles one raw input line and returns the response object, echoing `id`.
pub async fn handle_line(app: &App, line: &str) -> Value {
    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return json!({"id": null, "success": false, "error": format!("parse error: {}", e)});
        }
    };
    let id = raw.get("id").cloned().unwrap_or(Value::Null);

    let response = match serde_json::from_value::<Request>(raw) {
        Ok(request) => handle_request(app, request).await,
        Err(e) => {
            warn!(error = %e, "rejected request");
            Response::Err(format!("invalid request: {}", e))
        }
    };

    let mut value = response.to_value();
    if let Some(map) = value.as_object_mut() {
        map.insert("id".to_string(), id);
    }
    value
}

/// Dispatches a typed request.
pub async fn handle_request(app: &App, request: Request) -> Response {
    match request {
        // ─── Tab events ───
        Request::TabOpened { tab_id, url, title } => {
            app.tracker().open_tab(tab_id, &url, &title, now_ms());
            Response::Ok(Reply::Ack {})
        }
        Request::TabCompleted { tab_id, url, title, text } => {
            app.tracker().complete_navigation(tab_id, &url, &title, text, now_ms());
            Response::Ok(Reply::Ack {})
        }
        Request::TabActivated { tab_id } => {
            app.tracker().activate_tab(tab_id);
            Response::Ok(Reply::Ack {})
        }
        Request::TabClosed { tab_id } => {
            let removed = app.tracker().close_tab(tab_id);
            debug!(tab_id, removed, "tab closed");
            Response::Ok(Reply::Ack {})
        }
        Request::PageText { tab_id, text } => {
            let result = app.tracker().update_page_text(tab_id, &text);
            result.map(|_| Reply::Ack {}).into()
        }
        Request::Scroll {
            tab_id,
            scroll_top,
            scroll_height,
            viewport_height,
        } => {
            let thresholds = app.settings().visit;
            let sample = ScrollSample {
                scroll_top,
                scroll_height,
                viewport_height,
            };
            let result = {
                let mut tracker = app.tracker();
                tracker
                    .record_scroll(tab_id, sample, now_ms(), &thresholds)
                    .map(|fired| {
                        let validated = tracker.get_visit(tab_id).map(|v| v.validated).unwrap_or(false);
                        (fired, validated)
                    })
            };
            match result {
                Ok((fired, validated)) => {
                    app.dispatch_visits(fired.into_iter().collect());
                    Response::Ok(Reply::Tracked { validated })
                }
                Err(e) => Response::Err(e.to_string()),
            }
        }

        // ─── Archiving ───
        Request::ValidVisit { url, title, content } => {
            let settings = app.settings();
            app.orchestrator
                .handle_valid_visit(&settings, &url, &title, &content)
                .await
                .map(|outcome| match outcome {
                    ArchiveOutcome::Archived { path } => Reply::Archived {
                        archived: true,
                        path: Some(path),
                    },
                    ArchiveOutcome::AlreadySaved => Reply::Archived {
                        archived: false,
                        path: None,
                    },
                })
                .into()
        }

        // ─── Notes ───
        Request::GetActiveNote => match note_store(app) {
            Ok(client) => client.active_note().await.map(|path| Reply::ActiveNote { path }).into(),
            Err(e) => Response::Err(e.to_string()),
        },
        Request::CreateNote { path, content } => match note_store(app) {
            Ok(client) => client.create(&path, &content).await.map(|_| Reply::Ack {}).into(),
            Err(e) => Response::Err(e.to_string()),
        },
        Request::SendMemo { memo, path, title, url } => {
            let settings = app.settings();
            let active_page = app.tracker().active_visit().map(|visit| PageContext {
                title: visit.title.clone(),
                url: visit.url.clone(),
            });
            let request = MemoRequest { memo, path, title, url };
            app.memo_writer
                .send_memo(&settings, &request, active_page)
                .await
                .map(|outcome| Reply::MemoSent {
                    path: outcome.path,
                    new_context: outcome.new_context,
                })
                .into()
        }
        Request::SearchFiles { query } => match note_store(app) {
            Ok(client) => Response::Ok(Reply::SearchResults {
                results: client.search(&query).await,
            }),
            Err(e) => Response::Err(e.to_string()),
        },
        Request::ResolvePath { path } => match note_store(app) {
            Ok(client) => Response::Ok(Reply::Resolved {
                resolved_path: client.resolve_path(&path).await,
            }),
            Err(e) => Response::Err(e.to_string()),
        },

        // ─── Focus sessions ───
        Request::CheckFocusMode => Response::Ok(Reply::focus(&app.focus.status())),
        Request::StartSession { path } => app.focus.start(&path).await.map(|f| Reply::focus(&f)).into(),
        Request::CreateSessionNote { name } => app
            .focus
            .create_and_start(&name)
            .await
            .map(|f| Reply::focus(&f))
            .into(),
        Request::UseActiveNote => app.focus.use_active_note().await.map(|f| Reply::focus(&f)).into(),
        Request::StopSession => app.focus.stop().map(|f| Reply::focus(&f)).into(),

        // ─── Settings / misc ───
        Request::TestConnection => match note_store(app) {
            Ok(client) => client
                .ping()
                .await
                .map(|_| Reply::Connection {
                    message: format!("Connected to {}", client.base_url()),
                })
                .into(),
            Err(e) => Response::Err(e.to_string()),
        },
        Request::ListSavedUrls { limit } => {
            let result = {
                let conn = app.db.connection();
                let store = SavedUrlStore::new(&conn);
                store
                    .list(limit)
                    .and_then(|saved| store.count().map(|total| (saved, total)))
            };
            result.map(|(saved, total)| Reply::SavedUrls { saved, total }).into()
        }
        Request::GetSettings => Response::Ok(Reply::Settings {
            settings: app.settings(),
        }),
        Request::SetSetting { key, value } => {
            let mut engine = app.engine();
            engine.refresh();
            engine.set_value(&key, value).map(|_| Reply::Ack {}).into()
        }
        // Also ends any focus session, since it lives in the settings file.
        Request::ResetSettings => {
            let mut engine = app.engine();
            let result = engine.reset().map(|_| engine.get_settings().clone());
            result.map(|settings| Reply::Settings { settings }).into()
        }
        Request::Ping => Response::Ok(Reply::Pong { pong: true }),
    }
}
