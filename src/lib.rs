//! Smart History — archives meaningful page visits, with AI summaries, into
//! a note vault reachable over a local REST API, and captures quick memos.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
