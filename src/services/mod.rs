pub mod content_extractor;
pub mod focus_session;
pub mod memo_writer;
pub mod note_store;
pub mod notifier;
pub mod session_orchestrator;
pub mod settings_engine;
pub mod summarizer;
