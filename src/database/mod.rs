//! Smart History database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! state that must survive restarts: archived URLs and the memo context.
//!
//! # Usage
//!
//! ```no_run
//! use smart_history::database::Database;
//!
//! let db = Database::open("smart-history.db").expect("failed to open database");
//! let in_memory = Database::open_in_memory().expect("failed to open in-memory database");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
