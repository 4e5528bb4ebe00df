//! Archiving of validated visits.
//!
//! Takes a `ValidVisit` event, skips URLs already archived, summarizes the
//! page, formats one markdown list entry and appends it to the focus note or
//! the daily note. The URL joins the saved set only after the append
//! succeeded, so a failed archive can be retried by a later visit.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::{debug, info, warn};

use crate::database::Database;
use crate::managers::memo_context::{MemoContextTracker, MemoContextTrackerTrait};
use crate::managers::saved_urls::{SavedUrlStore, SavedUrlStoreTrait};
use crate::services::note_store::{NoteStoreClient, NoteStoreTrait};
use crate::services::notifier::{Notification, Notifier};
use crate::services::summarizer::{GeminiSummarizer, Summarizer};
use crate::types::errors::{ArchiveError, SummaryError};
use crate::types::settings::{NoteStoreSettings, Settings, SummarizerSettings};

pub const SUMMARY_UNAVAILABLE: &str = "Summary not available.";

/// Result of handling one valid visit.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    /// The entry was appended to the note at `path`.
    Archived { path: String },
    /// The URL had been archived before; nothing was written.
    AlreadySaved,
}

/// Coordinates dedup, summarization, note writes and notifications.
pub struct SessionOrchestrator {
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
}

impl SessionOrchestrator {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    pub async fn handle_valid_visit(
        &self,
        settings: &Settings,
        url: &str,
        title: &str,
        content: &str,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        self.handle_valid_visit_at(settings, url, title, content, Local::now())
            .await
    }

    /// Same as [`handle_valid_visit`](Self::handle_valid_visit) with an explicit clock.
    pub async fn handle_valid_visit_at<Tz: TimeZone>(
        &self,
        settings: &Settings,
        url: &str,
        title: &str,
        content: &str,
        now: DateTime<Tz>,
    ) -> Result<ArchiveOutcome, ArchiveError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let already_saved = {
            let conn = self.db.connection();
            SavedUrlStore::new(&conn).contains(url)?
        };
        if already_saved {
            debug!(url, "already archived, skipping");
            return Ok(ArchiveOutcome::AlreadySaved);
        }

        {
            let conn = self.db.connection();
            MemoContextTracker::new(&conn).set_context(url)?;
        }

        let result = self.archive(settings, url, title, content, now).await;
        match &result {
            Ok(path) => {
                info!(url, path = %path, "visit archived");
                self.notifier
                    .notify(Notification::success("Saved to Obsidian", format!("Saved: {}", title)));
            }
            Err(e) => {
                warn!(url, error = %e, "archive failed");
                self.notifier
                    .notify(Notification::failure("Obsidian Sync Failed", format!("Error: {}", e)));
            }
        }
        result.map(|path| ArchiveOutcome::Archived { path })
    }

    async fn archive<Tz: TimeZone>(
        &self,
        settings: &Settings,
        url: &str,
        title: &str,
        content: &str,
        now: DateTime<Tz>,
    ) -> Result<String, ArchiveError>
    where
        Tz::Offset: std::fmt::Display,
    {
        let summary = summarize_for_archive(&settings.summarizer, content).await;
        let entry = format_archive_entry(&now.format("%H:%M").to_string(), title, url, &summary);
        let path = target_note_path(settings, now.date_naive());

        let client = NoteStoreClient::from_settings(&settings.note_store)?;
        client.append(&path, &entry).await?;

        let conn = self.db.connection();
        SavedUrlStore::new(&conn).insert(url, title)?;
        Ok(path)
    }
}

/// Summary text for an archive entry. Never fails: problems become placeholder text.
pub async fn summarize_for_archive(settings: &SummarizerSettings, content: &str) -> String {
    let summarizer = match GeminiSummarizer::from_settings(settings) {
        Ok(summarizer) => summarizer,
        Err(e) => {
            warn!("summarizer API key is missing");
            return e.to_string();
        }
    };
    if content.trim().is_empty() {
        return SUMMARY_UNAVAILABLE.to_string();
    }
    summarize_with(&summarizer, settings, content).await
}

async fn summarize_with(summarizer: &dyn Summarizer, settings: &SummarizerSettings, content: &str) -> String {
    match summarizer.summarize(content, settings.length).await {
        Ok(summary) => summary,
        Err(e @ SummaryError::MissingApiKey) => e.to_string(),
        Err(e) => {
            warn!(error = %e, "summary generation failed");
            format!("Error generating summary: {}", e)
        }
    }
}

/// Replaces every line break with a space so the summary stays one list item.
pub fn sanitize_summary(summary: &str) -> String {
    summary.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// `- HH:MM [title](url)` followed by an indented summary bullet.
pub fn format_archive_entry(time: &str, title: &str, url: &str, summary: &str) -> String {
    format!(
        "- {} [{}]({})\n    - AI Summary: {}",
        time,
        title,
        url,
        sanitize_summary(summary)
    )
}

/// `{daily_folder}/YYYY-MM-DD.md`, with one trailing slash of the folder dropped.
pub fn daily_note_path(settings: &NoteStoreSettings, date: NaiveDate) -> String {
    let folder = settings
        .daily_folder
        .strip_suffix('/')
        .unwrap_or(&settings.daily_folder);
    format!("{}/{}.md", folder, date.format("%Y-%m-%d"))
}

/// Focus note when a session is active, otherwise the daily note for `date`.
pub fn target_note_path(settings: &Settings, date: NaiveDate) -> String {
    match settings.focus.target() {
        Some(target) => target.to_string(),
        None => daily_note_path(&settings.note_store, date),
    }
}
