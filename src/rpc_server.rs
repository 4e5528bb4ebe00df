//! Smart History RPC server: newline-delimited JSON over stdin/stdout.
//!
//! Request:  {"id":1, "type":"SEARCH_FILES", "query":"meeting"}
//! Response: {"id":1, "success":true, "results":[...]} or {"id":1, "success":false, "error":"..."}
//! Events:   {"event":"ready",...} and {"event":"notification",...}
//!
//! Logs go to stderr so stdout carries protocol lines only.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::BufReader;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_history::app::App;
use smart_history::platform;
use smart_history::rpc_handler::serve_lines;
use smart_history::services::notifier::{JsonLinesNotifier, Notifier};
use smart_history::types::visit::ValidVisit;

const DB_FILE: &str = "smart-history.db";
/// How long in-flight requests may still answer after stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn emit(value: &Value) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if writeln!(out, "{}", value).and_then(|_| out.flush()).is_err() {
        warn!("stdout closed");
    }
}

async fn write_responses(mut responses: UnboundedReceiver<Value>) {
    while let Some(response) = responses.recv().await {
        emit(&response);
    }
}

async fn archive_worker(app: Arc<App>, mut visits: UnboundedReceiver<ValidVisit>) {
    while let Some(visit) = visits.recv().await {
        let app = app.clone();
        tokio::spawn(async move {
            let url = visit.url.clone();
            match app.archive_visit(visit).await {
                Ok(outcome) => debug!(url = %url, ?outcome, "archive finished"),
                Err(e) => debug!(url = %url, error = %e, "archive failed"),
            }
        });
    }
}

async fn poll_loop(app: Arc<App>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        let fired = app.poll_visits(chrono::Utc::now().timestamp_millis());
        if fired > 0 {
            debug!(fired, "poll validated visits");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_history=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(dir = %data_dir.display(), error = %e, "cannot create data directory");
        std::process::exit(1);
    }
    let db_path = data_dir.join(DB_FILE);

    let notifier: Arc<dyn Notifier> = Arc::new(JsonLinesNotifier);
    let app = match App::new(
        &db_path.to_string_lossy(),
        platform::settings_path_override(),
        notifier,
    ) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize");
            std::process::exit(1);
        }
    };

    if let Some(visits) = app.take_visit_receiver() {
        tokio::spawn(archive_worker(app.clone(), visits));
    }
    tokio::spawn(poll_loop(app.clone()));

    info!(db = %db_path.display(), "smart history backend started");
    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_responses(response_rx));

    if let Err(e) = serve_lines(app, BufReader::new(tokio::io::stdin()), response_tx).await {
        error!(error = %e, "stdin read failed");
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, writer).await.is_err() {
        warn!("requests still pending at shutdown");
    }
    info!("stdin closed, shutting down");
}
