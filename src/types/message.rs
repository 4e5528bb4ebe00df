//! Request/response contract between the host (browser side) and the backend.
//!
//! Every [`Request`] is answered with exactly one [`Response`]; the reply
//! shape for each request type is fixed by the handler.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::settings::{FocusSession, Settings};
use super::visit::{SavedUrl, TabId};

/// Messages the host can send, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    TabOpened { tab_id: TabId, url: String, #[serde(default)] title: String },
    TabCompleted {
        tab_id: TabId,
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        text: Option<String>,
    },
    TabActivated { tab_id: TabId },
    TabClosed { tab_id: TabId },
    PageText { tab_id: TabId, text: String },
    Scroll {
        tab_id: TabId,
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    },
    ValidVisit { url: String, #[serde(default)] title: String, content: String },
    GetActiveNote,
    CreateNote { path: String, #[serde(default)] content: String },
    SendMemo {
        memo: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    SearchFiles { query: String },
    ResolvePath { path: String },
    CheckFocusMode,
    StartSession { path: String },
    CreateSessionNote { name: String },
    UseActiveNote,
    StopSession,
    TestConnection,
    ListSavedUrls {
        #[serde(default)]
        limit: Option<usize>,
    },
    GetSettings,
    SetSetting { key: String, value: Value },
    ResetSettings,
    Ping,
}

/// Success payloads, one shape per request family.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Ack {},
    Tracked { validated: bool },
    Archived {
        archived: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    ActiveNote { path: String },
    MemoSent { path: String, new_context: bool },
    SearchResults { results: Vec<String> },
    Resolved { resolved_path: String },
    Focus {
        active: bool,
        target_note: Option<String>,
        badge: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        badge_color: Option<String>,
    },
    Connection { message: String },
    SavedUrls { saved: Vec<SavedUrl>, total: usize },
    Settings { settings: Settings },
    Pong { pong: bool },
}

impl Reply {
    pub fn focus(session: &FocusSession) -> Self {
        Reply::Focus {
            active: session.active,
            target_note: session.target_note.clone(),
            badge: focus_badge(session).to_string(),
            badge_color: session.active.then(|| FOCUS_BADGE_COLOR.to_string()),
        }
    }
}

/// Badge text shown on the host's toolbar icon.
pub fn focus_badge(session: &FocusSession) -> &'static str {
    if session.active {
        "ON"
    } else {
        ""
    }
}

/// Badge colour used while a focus session is active.
pub const FOCUS_BADGE_COLOR: &str = "#2e8b57";

/// Outcome of a request: `{success: true, ...reply}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok(Reply),
    Err(String),
}

impl Response {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Flattens the response into the wire object.
    pub fn to_value(&self) -> Value {
        match self {
            Response::Ok(reply) => {
                let mut body = serde_json::to_value(reply).unwrap_or_else(|_| json!({}));
                match body.as_object_mut() {
                    Some(map) => {
                        map.insert("success".to_string(), Value::Bool(true));
                        body
                    }
                    None => json!({"success": true}),
                }
            }
            Response::Err(error) => json!({"success": false, "error": error}),
        }
    }
}

impl<E: std::fmt::Display> From<Result<Reply, E>> for Response {
    fn from(result: Result<Reply, E>) -> Self {
        match result {
            Ok(reply) => Response::Ok(reply),
            Err(e) => Response::Err(e.to_string()),
        }
    }
}
