//! Floating memo capture.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::database::Database;
use crate::managers::memo_context::{MemoContextTracker, MemoContextTrackerTrait};
use crate::services::note_store::{NoteStoreClient, NoteStoreTrait};
use crate::services::session_orchestrator::daily_note_path;
use crate::types::errors::MemoError;
use crate::types::settings::Settings;

/// A memo as submitted by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoRequest {
    pub memo: String,
    /// Explicit target note; falls back to the focus note, then the daily note.
    pub path: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoOutcome {
    pub path: String,
    pub new_context: bool,
}

/// Page a memo is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub title: String,
    pub url: String,
}

pub struct MemoWriter {
    db: Arc<Database>,
}

impl MemoWriter {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Appends a memo; `active_page` stands in when the request lacks a title or URL.
    pub async fn send_memo(
        &self,
        settings: &Settings,
        request: &MemoRequest,
        active_page: Option<PageContext>,
    ) -> Result<MemoOutcome, MemoError> {
        self.send_memo_at(settings, request, active_page, Local::now()).await
    }

    pub async fn send_memo_at<Tz: TimeZone>(
        &self,
        settings: &Settings,
        request: &MemoRequest,
        active_page: Option<PageContext>,
        now: DateTime<Tz>,
    ) -> Result<MemoOutcome, MemoError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let memo = request.memo.trim();
        if memo.is_empty() {
            return Err(MemoError::EmptyMemo);
        }

        let page = resolve_page(request, active_page).ok_or(MemoError::MissingContext)?;

        let path = request
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| settings.focus.target().map(str::to_string))
            .unwrap_or_else(|| daily_note_path(&settings.note_store, now.date_naive()));

        let client = NoteStoreClient::from_settings(&settings.note_store)?;

        let new_context = {
            let conn = self.db.connection();
            MemoContextTracker::new(&conn).is_new_context(&page.url)?
        };

        let formatted = format_memo(&now.format("%H:%M").to_string(), memo, &page, new_context);
        client.append(&path, &formatted).await?;

        info!(path = %path, new_context, "memo appended");
        Ok(MemoOutcome { path, new_context })
    }
}

fn resolve_page(request: &MemoRequest, active_page: Option<PageContext>) -> Option<PageContext> {
    let title = request.title.as_deref().filter(|t| !t.is_empty());
    let url = request.url.as_deref().filter(|u| !u.is_empty());

    match (title, url) {
        (Some(title), Some(url)) => Some(PageContext {
            title: title.to_string(),
            url: url.to_string(),
        }),
        _ => match active_page {
            Some(page) => Some(page),
            None => url.map(|url| PageContext {
                title: url.to_string(),
                url: url.to_string(),
            }),
        },
    }
}

/// Header line for a new page context, then the timestamped memo bullet.
pub fn format_memo(time: &str, memo: &str, page: &PageContext, new_context: bool) -> String {
    let mut formatted = String::new();
    if new_context {
        formatted.push_str(&format!("\n## [{}]({})\n", page.title, page.url));
    }
    formatted.push_str(&format!("- {} {}\n", time, memo));
    formatted
}
