// Smart History shared type definitions
// Each submodule defines types used across the application.

pub mod errors;
pub mod message;
pub mod note;
pub mod settings;
pub mod summary;
pub mod visit;
