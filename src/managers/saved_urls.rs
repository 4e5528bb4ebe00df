//! Saved URL set for Smart History.
//!
//! Implements `SavedUrlStoreTrait` — the durable set of URLs that have been
//! archived successfully, backed by SQLite via `rusqlite`. Entries are only
//! ever added; nothing here prunes the set.

use rusqlite::{params, Connection, OptionalExtension};

use crate::types::errors::StateError;
use crate::types::visit::SavedUrl;

/// Trait defining saved-URL operations.
pub trait SavedUrlStoreTrait {
    fn contains(&self, url: &str) -> Result<bool, StateError>;
    fn insert(&mut self, url: &str, title: &str) -> Result<bool, StateError>;
    fn list(&self, limit: Option<usize>) -> Result<Vec<SavedUrl>, StateError>;
    fn count(&self) -> Result<usize, StateError>;
}

/// Saved URL store backed by a SQLite connection.
pub struct SavedUrlStore<'a> {
    conn: &'a Connection,
}

impl<'a> SavedUrlStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_saved(row: &rusqlite::Row) -> rusqlite::Result<SavedUrl> {
        Ok(SavedUrl {
            url: row.get(0)?,
            title: row.get(1)?,
            saved_at: row.get(2)?,
        })
    }
}

impl<'a> SavedUrlStoreTrait for SavedUrlStore<'a> {
    fn contains(&self, url: &str) -> Result<bool, StateError> {
        self.conn
            .query_row("SELECT 1 FROM saved_urls WHERE url = ?1", params![url], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| StateError::DatabaseError(e.to_string()))
    }

    /// Adds a URL to the set. Returns false if it was already present.
    fn insert(&mut self, url: &str, title: &str) -> Result<bool, StateError> {
        let now = chrono::Utc::now().timestamp();
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO saved_urls (url, title, saved_at) VALUES (?1, ?2, ?3)",
                params![url, title, now],
            )
            .map_err(|e| StateError::DatabaseError(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Most recently saved first.
    fn list(&self, limit: Option<usize>) -> Result<Vec<SavedUrl>, StateError> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self
            .conn
            .prepare("SELECT url, title, saved_at FROM saved_urls ORDER BY saved_at DESC, rowid DESC LIMIT ?1")
            .map_err(|e| StateError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], Self::row_to_saved)
            .map_err(|e| StateError::DatabaseError(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StateError::DatabaseError(e.to_string()))
    }

    fn count(&self) -> Result<usize, StateError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM saved_urls", [], |row| row.get(0))
            .map_err(|e| StateError::DatabaseError(e.to_string()))?;
        Ok(count as usize)
    }
}
