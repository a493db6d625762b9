//! Core of the PcbDesk editor shell.
//! Owns the document lifecycle of editor windows and everything they need to
//! start: settings, projects, templates and the event loop.

pub mod application;
pub mod db;
pub mod event_loop;
pub mod fileio;
pub mod library;
pub mod logging;
pub mod project;
pub mod settings;
pub mod signal;
pub mod template;
pub mod window;

pub use application::{EditorApplication, ProjectPicker, StagedPicker, WorkspaceApplication};
pub use event_loop::{Clock, EventLoop, ManualClock, SystemClock, TimerId};
pub use fileio::FilePath;
pub use library::LibraryGui;
pub use logging::{default_log_level, init_logging, logging_status};
pub use project::{Library, OpenedProject, ProjectError, ProjectFile, SchematicGui};
pub use settings::{
    SettingsError, SettingsResult, SettingsStore, SqliteSettingsStore, LAST_OPEN_PROJECT_KEY,
};
pub use signal::{ConnectionId, ConnectionType, Signal};
pub use template::{
    ContextObject, ObjectCreated, ResourceTemplateEngine, TemplateEngine, TemplateObject,
};
pub use window::{EditorWindow, WindowOptions, APP_CONTEXT_NAME, WINDOW_CONTEXT_NAME};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
