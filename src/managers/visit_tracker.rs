//! Visit Tracker for Smart History.
//!
//! Owns the per-tab [`TabVisitState`] map and runs the validation state
//! machine (`Tracking → Validated`) for each tab.
//!
//! Lifecycle of an entry:
//! - created by `open_tab` (if absent) or `complete_navigation`;
//! - replaced wholesale by the next `complete_navigation`;
//! - removed by `close_tab`, or when the tab navigates to a non-http page.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::services::content_extractor::{ContentExtractor, PlainTextExtractor};
use crate::types::errors::VisitError;
use crate::types::settings::VisitSettings;
use crate::types::visit::{ScrollSample, TabId, TabVisitState, ValidVisit, VisitStatus};

/// Trait defining the visit tracking interface.
pub trait VisitTrackerTrait {
    fn open_tab(&mut self, tab_id: TabId, url: &str, title: &str, now_ms: i64);
    fn complete_navigation(&mut self, tab_id: TabId, url: &str, title: &str, text: Option<String>, now_ms: i64);
    fn activate_tab(&mut self, tab_id: TabId);
    fn close_tab(&mut self, tab_id: TabId) -> bool;
    fn update_page_text(&mut self, tab_id: TabId, text: &str) -> Result<(), VisitError>;
    fn record_scroll(
        &mut self,
        tab_id: TabId,
        sample: ScrollSample,
        now_ms: i64,
        thresholds: &VisitSettings,
    ) -> Result<Option<ValidVisit>, VisitError>;
    fn poll(&mut self, now_ms: i64, thresholds: &VisitSettings) -> Vec<ValidVisit>;
    fn get_visit(&self, tab_id: TabId) -> Option<&TabVisitState>;
    fn active_visit(&self) -> Option<&TabVisitState>;
    fn tracked_count(&self) -> usize;
}

/// In-memory visit tracker keyed by host tab id.
pub struct VisitTracker {
    visits: BTreeMap<TabId, TabVisitState>,
    active_tab: Option<TabId>,
    extractor: Box<dyn ContentExtractor + Send>,
}

impl VisitTracker {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(PlainTextExtractor))
    }

    pub fn with_extractor(extractor: Box<dyn ContentExtractor + Send>) -> Self {
        Self {
            visits: BTreeMap::new(),
            active_tab: None,
            extractor,
        }
    }

    fn is_trackable(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    /// Applies the transition rule to one tab. Returns the event when the
    /// tab moves from `Tracking` to `Validated`.
    fn check(
        extractor: &dyn ContentExtractor,
        tab_id: TabId,
        visit: &mut TabVisitState,
        now_ms: i64,
        thresholds: &VisitSettings,
    ) -> Option<ValidVisit> {
        if visit.status() == VisitStatus::Validated {
            return None;
        }

        let elapsed_ms = now_ms.saturating_sub(visit.start_time);
        let min_ms = i64::try_from(thresholds.min_visit_duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        if elapsed_ms < min_ms || visit.max_scroll_percentage < thresholds.min_scroll_depth_percent {
            return None;
        }

        let content = extractor.extract(visit.page_text.as_deref());
        visit.validated = true;
        visit.content = Some(content.clone());
        info!(tab_id, url = %visit.url, elapsed_ms, scroll = visit.max_scroll_percentage, "visit validated");

        Some(ValidVisit {
            tab_id,
            url: visit.url.clone(),
            title: visit.title.clone(),
            content,
        })
    }
}

impl Default for VisitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitTrackerTrait for VisitTracker {
    /// Starts tracking a tab that was open before the backend saw it load.
    /// An existing visit for the tab is left untouched.
    fn open_tab(&mut self, tab_id: TabId, url: &str, title: &str, now_ms: i64) {
        if !Self::is_trackable(url) {
            return;
        }
        self.visits
            .entry(tab_id)
            .or_insert_with(|| TabVisitState::new(url, title, now_ms));
    }

    /// A page finished loading: fresh start time, zero scroll, not validated.
    fn complete_navigation(&mut self, tab_id: TabId, url: &str, title: &str, text: Option<String>, now_ms: i64) {
        if !Self::is_trackable(url) {
            if self.visits.remove(&tab_id).is_some() {
                debug!(tab_id, url, "tab left http(s); tracking dropped");
            }
            return;
        }
        let mut visit = TabVisitState::new(url, title, now_ms);
        visit.page_text = text;
        self.visits.insert(tab_id, visit);
        debug!(tab_id, url, "tracking new page view");
    }

    fn activate_tab(&mut self, tab_id: TabId) {
        self.active_tab = Some(tab_id);
    }

    /// Forgets a closed tab. Returns whether it was tracked.
    fn close_tab(&mut self, tab_id: TabId) -> bool {
        if self.active_tab == Some(tab_id) {
            self.active_tab = None;
        }
        self.visits.remove(&tab_id).is_some()
    }

    fn update_page_text(&mut self, tab_id: TabId, text: &str) -> Result<(), VisitError> {
        let visit = self.visits.get_mut(&tab_id).ok_or(VisitError::UnknownTab(tab_id))?;
        visit.page_text = Some(text.to_string());
        Ok(())
    }

    /// Folds a scroll sample into the tab's maximum depth, then checks the
    /// thresholds. Samples from pages without a scrollable area are ignored.
    fn record_scroll(
        &mut self,
        tab_id: TabId,
        sample: ScrollSample,
        now_ms: i64,
        thresholds: &VisitSettings,
    ) -> Result<Option<ValidVisit>, VisitError> {
        let visit = self.visits.get_mut(&tab_id).ok_or(VisitError::UnknownTab(tab_id))?;

        if let Some(percentage) = sample.percentage() {
            if percentage > visit.max_scroll_percentage {
                visit.max_scroll_percentage = percentage;
            }
        }

        Ok(Self::check(self.extractor.as_ref(), tab_id, visit, now_ms, thresholds))
    }

    /// Timer-driven check across every tracked tab.
    fn poll(&mut self, now_ms: i64, thresholds: &VisitSettings) -> Vec<ValidVisit> {
        let extractor = self.extractor.as_ref();
        self.visits
            .iter_mut()
            .filter_map(|(tab_id, visit)| Self::check(extractor, *tab_id, visit, now_ms, thresholds))
            .collect()
    }

    fn get_visit(&self, tab_id: TabId) -> Option<&TabVisitState> {
        self.visits.get(&tab_id)
    }

    fn active_visit(&self) -> Option<&TabVisitState> {
        self.active_tab.and_then(|id| self.visits.get(&id))
    }

    fn tracked_count(&self) -> usize {
        self.visits.len()
    }
}
