// Smart History state managers
// Managers handle stateful operations: per-tab visit tracking, the saved URL set, and the memo context.

pub mod memo_context;
pub mod saved_urls;
pub mod visit_tracker;
