//! User-visible notifications.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn failure(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Sink for notifications shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!(title = %notification.title, message = %notification.message, "notification")
            }
            NotificationKind::Failure => {
                warn!(title = %notification.title, message = %notification.message, "notification")
            }
        }
    }
}

/// Wire form of a notification on the JSON-lines channel.
pub fn notification_event(notification: &Notification) -> Value {
    json!({
        "event": "notification",
        "id": Uuid::new_v4().to_string(),
        "kind": notification.kind,
        "title": notification.title,
        "message": notification.message,
    })
}

/// Emits notifications as events on stdout, next to the RPC responses.
#[derive(Debug, Default)]
pub struct JsonLinesNotifier;

impl Notifier for JsonLinesNotifier {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if writeln!(out, "{}", notification_event(&notification)).and_then(|_| out.flush()).is_err() {
            warn!("could not write notification to stdout");
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        match self.received.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
