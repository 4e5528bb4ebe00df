use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier.
pub type TabId = i64;

/// Tracking state of a single page view, replaced wholesale on every navigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabVisitState {
    pub title: String,
    pub url: String,
    /// Epoch milliseconds at which the page finished loading.
    pub start_time: i64,
    pub max_scroll_percentage: f64,
    pub validated: bool,
    /// Page text captured when the visit validated.
    pub content: Option<String>,
    /// Latest raw page text reported by the host.
    pub page_text: Option<String>,
}

impl TabVisitState {
    pub fn new(url: &str, title: &str, start_time: i64) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            start_time,
            max_scroll_percentage: 0.0,
            validated: false,
            content: None,
            page_text: None,
        }
    }

    pub fn status(&self) -> VisitStatus {
        if self.validated {
            VisitStatus::Validated
        } else {
            VisitStatus::Tracking
        }
    }
}

/// State of the per-tab validation machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VisitStatus {
    Tracking,
    Validated,
}

/// One scroll-position sample reported by the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ScrollSample {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollSample {
    /// Scroll depth in percent, or `None` when the page has no scrollable area.
    pub fn percentage(&self) -> Option<f64> {
        let scrollable = self.scroll_height - self.viewport_height;
        if scrollable <= 0.0 {
            return None;
        }
        Some((self.scroll_top / scrollable * 100.0).clamp(0.0, 100.0))
    }
}

/// Emitted exactly once per navigation when a page view becomes a real visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidVisit {
    pub tab_id: TabId,
    pub url: String,
    pub title: String,
    pub content: String,
}

/// A URL recorded as archived; `saved_at` is epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedUrl {
    pub url: String,
    pub title: String,
    pub saved_at: i64,
}
