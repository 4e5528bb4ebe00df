use serde::{Deserialize, Serialize};

use super::summary::SummaryLength;

/// Top-level settings container, persisted as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub note_store: NoteStoreSettings,
    #[serde(default)]
    pub summarizer: SummarizerSettings,
    #[serde(default)]
    pub visit: VisitSettings,
    #[serde(default)]
    pub focus: FocusSession,
}

/// Connection details for the local note store REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteStoreSettings {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Folder holding the `YYYY-MM-DD.md` daily notes.
    #[serde(default = "default_daily_folder")]
    pub daily_folder: String,
    /// Folder searched when resolving bare note names.
    #[serde(default)]
    pub default_folder: Option<String>,
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    27123
}

fn default_daily_folder() -> String {
    "Daily".to_string()
}

impl Default for NoteStoreSettings {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            host: default_host(),
            port: default_port(),
            api_key: None,
            daily_folder: default_daily_folder(),
            default_folder: None,
        }
    }
}

/// Summarization service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizerSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub length: SummaryLength,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            length: SummaryLength::default(),
        }
    }
}

/// Thresholds a page view must cross to count as a real visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VisitSettings {
    #[serde(default = "default_min_visit_duration")]
    pub min_visit_duration_secs: u64,
    #[serde(default = "default_min_scroll_depth")]
    pub min_scroll_depth_percent: f64,
}

fn default_min_visit_duration() -> u64 {
    5
}

fn default_min_scroll_depth() -> f64 {
    50.0
}

impl Default for VisitSettings {
    fn default() -> Self {
        Self {
            min_visit_duration_secs: default_min_visit_duration(),
            min_scroll_depth_percent: default_min_scroll_depth(),
        }
    }
}

/// Focus mode: archive and memo into one fixed note instead of the daily note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FocusSession {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub target_note: Option<String>,
}

impl FocusSession {
    /// The note that receives entries while the session is active.
    pub fn target(&self) -> Option<&str> {
        if self.active {
            self.target_note.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        }
    }
}
