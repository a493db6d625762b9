//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one editor window per UI thread to Dart via FRB.
//! - Let the Dart side pick files itself and hand the chosen path over.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls made before `window_start` are harmless: they return `false`,
//!   `None`, or an empty value.
//! - Dart drives the event loop through `window_process_events`.

use pcbdesk_core::window::MAIN_WINDOW_TEMPLATE;
use pcbdesk_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, EditorWindow,
    EventLoop, FilePath, ResourceTemplateEngine, SqliteSettingsStore, StagedPicker,
    WindowOptions, WorkspaceApplication,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const SETTINGS_DB_ENV: &str = "PCBDESK_SETTINGS_DB";
const SETTINGS_DB_FILE_NAME: &str = "pcbdesk_settings.sqlite3";

struct Session {
    event_loop: EventLoop,
    window: Rc<EditorWindow>,
    picker: Rc<StagedPicker>,
    notifications: Rc<RefCell<Vec<String>>>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Project currently shown by the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Project display name.
    pub name: String,
    /// Absolute project file path.
    pub path: String,
    /// Schematic names in index order.
    pub schematics: Vec<String>,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the editor window for this thread, replacing any previous one.
///
/// `resources_dir` must contain `ui/main_window.json`. Settings live in the
/// database named by `PCBDESK_SETTINGS_DB`, or in the temp directory.
///
/// # FFI contract
/// - Sync call; opens the settings database.
/// - Never panics; returns empty string on success and error message on failure.
/// - The last project is restored on a later `window_process_events` call.
#[flutter_rust_bridge::frb(sync)]
pub fn window_start(resources_dir: String, workspace_dir: String) -> String {
    match start_session(&resources_dir, &workspace_dir, &resolve_settings_db_path()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Window title, empty before `window_start`.
#[flutter_rust_bridge::frb(sync)]
pub fn window_title() -> String {
    with_session(|session| session.window.title().to_string()).unwrap_or_default()
}

/// Runs one turn of the window event loop.
///
/// Returns how many timers and tasks ran.
#[flutter_rust_bridge::frb(sync)]
pub fn window_process_events() -> u32 {
    // The loop is cloned out so window callbacks may re-enter the session.
    let Some(event_loop) = with_session(|session| session.event_loop.clone()) else {
        return 0;
    };
    u32::try_from(event_loop.process_events()).unwrap_or(u32::MAX)
}

/// Creates a project at `path` and shows it.
///
/// The `.pcbproj` extension is appended when missing.
#[flutter_rust_bridge::frb(sync)]
pub fn window_create_project(path: String) -> bool {
    let Some((window, picker)) = window_and_picker() else {
        return false;
    };
    picker.stage(FilePath::new(path.trim()));
    let created = window.create_project();
    picker.clear();
    created
}

/// Opens the project file at `path` and shows it.
#[flutter_rust_bridge::frb(sync)]
pub fn window_open_project(path: String) -> bool {
    let Some((window, picker)) = window_and_picker() else {
        return false;
    };
    picker.stage(FilePath::new(path.trim()));
    let opened = window.open_project();
    picker.clear();
    opened
}

/// Shows schematic `index` of the current project.
#[flutter_rust_bridge::frb(sync)]
pub fn window_open_schematic(index: u32) -> bool {
    let Some(window) = current_window() else {
        return false;
    };
    usize::try_from(index).is_ok_and(|index| window.open_schematic(index))
}

/// Closes the current project. Returns `false` before `window_start`.
#[flutter_rust_bridge::frb(sync)]
pub fn window_close_project() -> bool {
    let Some(window) = current_window() else {
        return false;
    };
    window.close_project();
    true
}

#[flutter_rust_bridge::frb(sync)]
pub fn window_current_project() -> Option<ProjectSummary> {
    let project = current_window()?.current_project()?;
    Some(ProjectSummary {
        name: project.name().to_string(),
        path: project.path().to_string(),
        schematics: project
            .schematics()
            .iter()
            .map(|schematic| schematic.name().to_string())
            .collect(),
    })
}

/// Name of the schematic being shown, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn window_current_schematic() -> Option<String> {
    let schematic = current_window()?.current_schematic()?;
    Some(schematic.name().to_string())
}

/// Library names of the current project, as the library panel lists them.
#[flutter_rust_bridge::frb(sync)]
pub fn window_libraries() -> Vec<String> {
    current_window()
        .map(|window| {
            window
                .library_guis()
                .iter()
                .map(|library| library.name())
                .collect()
        })
        .unwrap_or_default()
}

/// Drains the change notifications recorded since the last call.
///
/// Entries are `project` or `schematic`, in emission order.
#[flutter_rust_bridge::frb(sync)]
pub fn window_take_notifications() -> Vec<String> {
    with_session(|session| std::mem::take(&mut *session.notifications.borrow_mut()))
        .unwrap_or_default()
}

fn start_session(
    resources_dir: &str,
    workspace_dir: &str,
    settings_db: &Path,
) -> Result<(), String> {
    let resources = FilePath::new(resources_dir.trim());
    if !resources.is_existing_dir() {
        return Err(format!(
            "window_start failed: resources_dir `{}` is not a directory",
            resources_dir.trim()
        ));
    }
    let main_template = resources.path_to(MAIN_WINDOW_TEMPLATE);
    if !main_template.is_existing_file() {
        return Err(format!(
            "window_start failed: missing main template `{main_template}`"
        ));
    }
    let workspace = FilePath::new(workspace_dir.trim());
    if !workspace.is_valid() {
        return Err("window_start failed: workspace_dir must be an absolute path".to_string());
    }

    let settings = Rc::new(
        SqliteSettingsStore::open(settings_db)
            .map_err(|err| format!("window_start failed: settings DB open failed: {err}"))?,
    );
    let picker = Rc::new(StagedPicker::new());
    let application = Rc::new(WorkspaceApplication::new(
        workspace,
        settings.clone(),
        picker.clone(),
    ));
    let event_loop = EventLoop::new();
    let window = EditorWindow::new(
        application,
        settings,
        Box::new(ResourceTemplateEngine::new(&event_loop)),
        &event_loop,
        WindowOptions::new(resources),
    );

    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = notifications.clone();
    window
        .current_project_changed()
        .connect(move |_| sink.borrow_mut().push("project".to_string()));
    let sink = notifications.clone();
    window
        .current_schematic_changed()
        .connect(move |_| sink.borrow_mut().push("schematic".to_string()));

    let previous = SESSION.with(|slot| {
        slot.borrow_mut().replace(Session {
            event_loop,
            window,
            picker,
            notifications,
        })
    });
    if previous.is_some() {
        log::info!("event=window_replace module=ffi status=ok");
    }
    // Dropped outside the slot borrow; window teardown may call back in.
    drop(previous);
    Ok(())
}

fn with_session<T>(f: impl FnOnce(&Session) -> T) -> Option<T> {
    SESSION.with(|slot| slot.borrow().as_ref().map(f))
}

fn current_window() -> Option<Rc<EditorWindow>> {
    with_session(|session| session.window.clone())
}

fn window_and_picker() -> Option<(Rc<EditorWindow>, Rc<StagedPicker>)> {
    with_session(|session| (session.window.clone(), session.picker.clone()))
}

fn resolve_settings_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(SETTINGS_DB_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(SETTINGS_DB_FILE_NAME)
}
