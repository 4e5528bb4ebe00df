//! Focus sessions: route archives and memos into one chosen note.
//!
//! The session lives in the settings file under `focus`, so it survives
//! restarts and is visible to every other component through the settings
//! snapshot they read per operation.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::services::note_store::{NoteStoreClient, NoteStoreTrait};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::FocusError;
use crate::types::settings::{FocusSession, Settings};

/// Trait defining focus session operations.
#[async_trait::async_trait]
pub trait FocusSessionTrait {
    fn status(&self) -> FocusSession;
    async fn start(&self, name: &str) -> Result<FocusSession, FocusError>;
    async fn create_and_start(&self, name: &str) -> Result<FocusSession, FocusError>;
    async fn use_active_note(&self) -> Result<FocusSession, FocusError>;
    fn stop(&self) -> Result<FocusSession, FocusError>;
}

pub struct FocusSessionService {
    settings: Arc<Mutex<SettingsEngine>>,
}

impl FocusSessionService {
    pub fn new(settings: Arc<Mutex<SettingsEngine>>) -> Self {
        Self { settings }
    }

    fn engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> Settings {
        self.engine().refresh()
    }

    fn activate(&self, target: String) -> Result<FocusSession, FocusError> {
        let focus = FocusSession {
            active: true,
            target_note: Some(target),
        };
        self.engine().set_focus(focus.clone())?;
        info!(target = ?focus.target_note, "focus session started");
        Ok(focus)
    }
}

#[async_trait::async_trait]
impl FocusSessionTrait for FocusSessionService {
    fn status(&self) -> FocusSession {
        self.snapshot().focus
    }

    /// Resolves a typed note name and starts a session on it.
    ///
    /// When the name cannot be resolved it is used as typed, with `.md` added.
    async fn start(&self, name: &str) -> Result<FocusSession, FocusError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FocusError::EmptyName);
        }

        let settings = self.snapshot();
        let resolved = match NoteStoreClient::from_settings(&settings.note_store) {
            Ok(client) => client.resolve_path(name).await,
            Err(e) => {
                warn!(error = %e, "cannot resolve focus note, using name as typed");
                name.to_string()
            }
        };

        let target = if resolved == name && !resolved.ends_with(".md") {
            format!("{}.md", resolved)
        } else {
            resolved
        };
        self.activate(target)
    }

    /// Creates a fresh note in the default folder and starts a session on it.
    async fn create_and_start(&self, name: &str) -> Result<FocusSession, FocusError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FocusError::EmptyName);
        }

        let settings = self.snapshot();
        let path = new_note_path(settings.note_store.default_folder.as_deref(), name);
        let client = NoteStoreClient::from_settings(&settings.note_store)?;
        client.create(&path, &new_note_content(name)).await?;
        self.activate(path)
    }

    async fn use_active_note(&self) -> Result<FocusSession, FocusError> {
        let settings = self.snapshot();
        let client = NoteStoreClient::from_settings(&settings.note_store)?;
        let path = client.active_note().await?;
        self.activate(path)
    }

    fn stop(&self) -> Result<FocusSession, FocusError> {
        let focus = FocusSession::default();
        self.engine().set_focus(focus.clone())?;
        info!("focus session stopped");
        Ok(focus)
    }
}

/// `{folder}/{name}` with `.md` ensured and one leading slash removed.
pub fn new_note_path(default_folder: Option<&str>, name: &str) -> String {
    let mut path = match default_folder.filter(|f| !f.is_empty()) {
        Some(folder) => format!("{}/{}", folder, name),
        None => name.to_string(),
    };
    if !path.ends_with(".md") {
        path.push_str(".md");
    }
    match path.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

pub fn new_note_content(name: &str) -> String {
    format!("# {}\n\nCreated via Smart History Focus Mode\n", name)
}
