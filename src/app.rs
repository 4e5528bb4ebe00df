//! App Core for Smart History.
//!
//! Holds the shared database, the settings engine, the per-tab visit tracker
//! and the services built on top of them. Validated visits are handed off
//! through an unbounded channel so that tab events are answered without
//! waiting for the archive round trip.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::database::Database;
use crate::managers::visit_tracker::{VisitTracker, VisitTrackerTrait};
use crate::services::focus_session::FocusSessionService;
use crate::services::memo_writer::MemoWriter;
use crate::services::notifier::Notifier;
use crate::services::session_orchestrator::{ArchiveOutcome, SessionOrchestrator};
use crate::services::settings_engine::SettingsEngine;
use crate::types::errors::ArchiveError;
use crate::types::settings::Settings;
use crate::types::visit::ValidVisit;

/// Central application struct.
///
/// SavedUrlStore and MemoContextTracker borrow the connection with a
/// lifetime, so services create them on demand from `db.connection()`.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: Arc<Mutex<SettingsEngine>>,
    pub visit_tracker: Mutex<VisitTracker>,
    pub notifier: Arc<dyn Notifier>,
    pub orchestrator: SessionOrchestrator,
    pub memo_writer: MemoWriter,
    pub focus: FocusSessionService,
    visit_tx: UnboundedSender<ValidVisit>,
    visit_rx: Mutex<Option<UnboundedReceiver<ValidVisit>>>,
}

impl App {
    /// Opens the database at `db_path` and the settings file at `settings_path`
    /// (platform default when `None`).
    pub fn new(
        db_path: &str,
        settings_path: Option<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        Ok(Self::from_parts(db, settings_path, notifier))
    }

    /// Same as [`App::new`] with a throwaway in-memory database.
    pub fn in_memory(
        settings_path: Option<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open_in_memory()?;
        Ok(Self::from_parts(db, settings_path, notifier))
    }

    fn from_parts(db: Database, settings_path: Option<String>, notifier: Arc<dyn Notifier>) -> Self {
        let db = Arc::new(db);
        let mut engine = SettingsEngine::new(settings_path);
        engine.refresh();
        let settings_engine = Arc::new(Mutex::new(engine));
        let (visit_tx, visit_rx) = mpsc::unbounded_channel();

        Self {
            orchestrator: SessionOrchestrator::new(db.clone(), notifier.clone()),
            memo_writer: MemoWriter::new(db.clone()),
            focus: FocusSessionService::new(settings_engine.clone()),
            db,
            settings_engine,
            visit_tracker: Mutex::new(VisitTracker::new()),
            notifier,
            visit_tx,
            visit_rx: Mutex::new(Some(visit_rx)),
        }
    }

    /// Fresh settings snapshot, re-read from disk.
    pub fn settings(&self) -> Settings {
        self.engine().refresh()
    }

    pub fn engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn tracker(&self) -> MutexGuard<'_, VisitTracker> {
        self.visit_tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Receiver of validated visits. Can be taken once.
    pub fn take_visit_receiver(&self) -> Option<UnboundedReceiver<ValidVisit>> {
        self.visit_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    pub fn dispatch_visits(&self, visits: Vec<ValidVisit>) {
        for visit in visits {
            if self.visit_tx.send(visit).is_err() {
                warn!("visit receiver dropped, validated visit lost");
            }
        }
    }

    /// Runs the time-based validation check over every tracked tab.
    pub fn poll_visits(&self, now_ms: i64) -> usize {
        let thresholds = self.settings().visit;
        let visits = self.tracker().poll(now_ms, &thresholds);
        let count = visits.len();
        self.dispatch_visits(visits);
        count
    }

    pub async fn archive_visit(&self, visit: ValidVisit) -> Result<ArchiveOutcome, ArchiveError> {
        let settings = self.settings();
        self.orchestrator
            .handle_valid_visit(&settings, &visit.url, &visit.title, &visit.content)
            .await
    }
}
