//! Memo context tracking.
//!
//! Remembers which page the latest memo or archived visit belonged to, so a
//! memo on a new page gets a header while follow-up memos on the same page
//! do not. The value lives in the `state_entries` table and is shared by the
//! archive and memo flows (last writer wins).

use rusqlite::{params, Connection, OptionalExtension};
use url::{Position, Url};

use crate::types::errors::StateError;

const LAST_CONTEXT_KEY: &str = "last_context_url";

/// Normalizes a page URL for context comparison.
///
/// Drops the fragment and a trailing path slash; keeps scheme, host, port,
/// path and query. Strings that do not parse as URLs are returned unchanged.
pub fn normalize_context_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return raw.to_string();
    };

    // Opaque origins (extension pages, custom schemes) serialize as "null",
    // so the prefix comes from the URL itself.
    let mut normalized = url[..Position::BeforePath].to_string();
    normalized.push_str(url.path().strip_suffix('/').unwrap_or(url.path()));
    if let Some(query) = url.query() {
        normalized.push('?');
        normalized.push_str(query);
    }
    normalized
}

/// Trait defining memo context operations.
pub trait MemoContextTrackerTrait {
    fn is_new_context(&mut self, url: &str) -> Result<bool, StateError>;
    fn set_context(&mut self, url: &str) -> Result<(), StateError>;
    fn last_context(&self) -> Result<Option<String>, StateError>;
}

/// Memo context tracker backed by a SQLite connection.
pub struct MemoContextTracker<'a> {
    conn: &'a Connection,
}

impl<'a> MemoContextTracker<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> MemoContextTrackerTrait for MemoContextTracker<'a> {
    /// Compares `url` against the stored context and then stores it.
    /// An unset context counts as different.
    fn is_new_context(&mut self, url: &str) -> Result<bool, StateError> {
        let normalized = normalize_context_url(url);
        let previous = self.last_context()?;
        self.set_context(url)?;
        Ok(previous.as_deref() != Some(normalized.as_str()))
    }

    fn set_context(&mut self, url: &str) -> Result<(), StateError> {
        let normalized = normalize_context_url(url);
        let now = chrono::Utc::now().timestamp();
        self.conn
            .execute(
                "INSERT OR REPLACE INTO state_entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![LAST_CONTEXT_KEY, normalized, now],
            )
            .map_err(|e| StateError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn last_context(&self) -> Result<Option<String>, StateError> {
        self.conn
            .query_row(
                "SELECT value FROM state_entries WHERE key = ?1",
                params![LAST_CONTEXT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StateError::DatabaseError(e.to_string()))
    }
}
