//! Core library surface for the Library Manager TUI application.
//!
//! The record operations in [`db`] are usable without the terminal front-end,
//! so the `bin` target and the integration tests share the same entry points.
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod ui;

/// Settings resolved from the environment at startup.
pub use config::Settings;

/// Domain failures surfaced to the user. Operations return `anyhow::Error`,
/// which can be downcast to this type.
pub use error::LibraryError;

/// The two primary record types plus their unsaved counterparts.
pub use models::{Book, BookDraft, BookStatus, Student, StudentDraft};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
