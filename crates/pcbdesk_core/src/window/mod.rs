//! Top-level editor window controller.
//!
//! # Responsibility
//! - Own the project and schematic currently open in this window.
//! - Publish changes of either reference to the presentation layer.
//! - Start the UI template and restore the last session on startup.
//!
//! # Invariants
//! - Switching to a different project clears the schematic first, then swaps
//!   the project; one notification per reference that changed.
//! - Setting a reference to the instance it already holds does nothing.
//!   Instances are compared by identity, never by content.
//! - No state borrow is held while a change signal is emitted.
//! - Deferred callbacks hold the window weakly and do nothing once it is
//!   dropped.

mod options;

pub use options::{
    fatal_abort, FatalHandler, WindowOptions, DEFAULT_STARTUP_DELAY, MAIN_WINDOW_TEMPLATE,
};

use crate::application::EditorApplication;
use crate::event_loop::EventLoop;
use crate::fileio::FilePath;
use crate::library::LibraryGui;
use crate::project::{OpenedProject, SchematicGui};
use crate::settings::{SettingsStore, LAST_OPEN_PROJECT_KEY};
use crate::signal::Signal;
use crate::template::{ContextObject, TemplateEngine};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Context name under which templates see the application.
pub const APP_CONTEXT_NAME: &str = "app";
/// Context name under which templates see the window.
pub const WINDOW_CONTEXT_NAME: &str = "window";

const WINDOW_TITLE_PREFIX: &str = "PcbDesk";

#[derive(Default)]
struct WindowState {
    project: Option<Rc<OpenedProject>>,
    schematic: Option<Rc<SchematicGui>>,
}

/// Editor window controller: owns the open project and schematic.
pub struct EditorWindow {
    application: Rc<dyn EditorApplication>,
    settings: Rc<dyn SettingsStore>,
    title: String,
    main_template: FilePath,
    engine: Box<dyn TemplateEngine>,
    state: RefCell<WindowState>,
    current_project_changed: Signal<()>,
    current_schematic_changed: Signal<()>,
}

impl EditorWindow {
    /// Builds the window and starts its UI.
    ///
    /// Loading of the main template and the session restore both happen on
    /// later turns of `event_loop`; nothing observable runs before this
    /// returns.
    pub fn new(
        application: Rc<dyn EditorApplication>,
        settings: Rc<dyn SettingsStore>,
        mut engine: Box<dyn TemplateEngine>,
        event_loop: &EventLoop,
        options: WindowOptions,
    ) -> Rc<Self> {
        let title = format!("{WINDOW_TITLE_PREFIX} {}", application.version());
        let main_template = options.resources_dir.path_to(MAIN_WINDOW_TEMPLATE);

        Rc::new_cyclic(|this: &Weak<Self>| {
            let expected = main_template.clone();
            let fatal = options.fatal_handler.clone();
            let observer = this.clone();
            engine
                .object_created()
                .connect_queued(event_loop, move |created| {
                    if created.object.is_some() || observer.upgrade().is_none() {
                        return;
                    }
                    if created.url == expected {
                        fatal(&format!("failed to load the main window template `{expected}`"));
                    } else {
                        warn!(
                            "event=template_component module=window status=error url={}",
                            created.url
                        );
                    }
                });
            engine.set_context_property(
                APP_CONTEXT_NAME,
                ContextObject::Application(application.clone()),
            );
            engine.set_context_property(WINDOW_CONTEXT_NAME, ContextObject::Window(this.clone()));
            engine.load(&main_template);

            let restore_target = this.clone();
            event_loop.single_shot(options.startup_delay, move || {
                if let Some(window) = restore_target.upgrade() {
                    window.restore_last_project();
                }
            });
            info!("event=window_open module=window status=ok title={title}");

            Self {
                application,
                settings,
                title,
                main_template,
                engine,
                state: RefCell::new(WindowState::default()),
                current_project_changed: Signal::new(),
                current_schematic_changed: Signal::new(),
            }
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Location of the main window template this window loaded.
    pub fn main_template(&self) -> &FilePath {
        &self.main_template
    }

    pub fn engine(&self) -> &dyn TemplateEngine {
        self.engine.as_ref()
    }

    pub fn current_project(&self) -> Option<Rc<OpenedProject>> {
        self.state.borrow().project.clone()
    }

    pub fn current_schematic(&self) -> Option<Rc<SchematicGui>> {
        self.state.borrow().schematic.clone()
    }

    pub fn current_project_changed(&self) -> &Signal<()> {
        &self.current_project_changed
    }

    pub fn current_schematic_changed(&self) -> &Signal<()> {
        &self.current_schematic_changed
    }

    /// Asks the application for a new project and shows it.
    ///
    /// Returns `false` (and changes nothing) when no project was created.
    pub fn create_project(&self) -> bool {
        match self.application.create_project() {
            Some(project) => {
                self.set_current_project(Some(project));
                true
            }
            None => false,
        }
    }

    /// Asks the application to open a project and shows it.
    ///
    /// Returns `false` (and changes nothing) when nothing was opened.
    pub fn open_project(&self) -> bool {
        match self.application.open_project() {
            Some(project) => {
                self.set_current_project(Some(project));
                true
            }
            None => false,
        }
    }

    pub fn close_project(&self) {
        self.set_current_project(None);
    }

    /// Shows schematic `index` of the current project.
    pub fn open_schematic(&self, index: usize) -> bool {
        let schematic = self
            .current_project()
            .and_then(|project| project.schematic(index));
        match schematic {
            Some(schematic) => {
                self.set_current_schematic(Some(schematic));
                true
            }
            None => false,
        }
    }

    /// Adapters for the libraries of the current project.
    pub fn library_guis(&self) -> Vec<LibraryGui> {
        self.current_project()
            .map(|project| project.library_guis())
            .unwrap_or_default()
    }

    pub(crate) fn set_current_project(&self, project: Option<Rc<OpenedProject>>) {
        let unchanged = same_instance(&self.state.borrow().project, &project);
        if unchanged {
            return;
        }

        self.set_current_schematic(None);
        let project_id = project.as_ref().map(|project| project.id().to_string());
        let previous = std::mem::replace(&mut self.state.borrow_mut().project, project);
        drop(previous);
        info!(
            "event=current_project_changed module=window status=ok project_id={}",
            project_id.as_deref().unwrap_or("none")
        );
        self.current_project_changed.emit(&());
    }

    pub(crate) fn set_current_schematic(&self, schematic: Option<Rc<SchematicGui>>) {
        let unchanged = same_instance(&self.state.borrow().schematic, &schematic);
        if unchanged {
            return;
        }

        let index = schematic.as_ref().map(|schematic| schematic.index());
        let previous = std::mem::replace(&mut self.state.borrow_mut().schematic, schematic);
        drop(previous);
        debug!(
            "event=current_schematic_changed module=window status=ok index={}",
            index.map_or_else(|| "none".to_string(), |index| index.to_string())
        );
        self.current_schematic_changed.emit(&());
    }

    /// Best-effort reopen of the project used last.
    fn restore_last_project(&self) {
        let fallback = self.application.workspace_path().to_string();
        let raw = match self.settings.value_or(LAST_OPEN_PROJECT_KEY, &fallback) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=session_restore module=window status=error key={LAST_OPEN_PROJECT_KEY} error={err}"
                );
                fallback
            }
        };

        let path = FilePath::new(&raw);
        if !path.is_valid() {
            debug!("event=session_restore module=window status=skipped reason=invalid_path");
            return;
        }
        match self.application.open_project_at(&path) {
            Some(project) => self.set_current_project(Some(project)),
            None => info!(
                "event=session_restore module=window status=skipped reason=open_failed path={path}"
            ),
        }
    }
}

fn same_instance<T>(current: &Option<Rc<T>>, candidate: &Option<Rc<T>>) -> bool {
    match (current, candidate) {
        (None, None) => true,
        (Some(current), Some(candidate)) => Rc::ptr_eq(current, candidate),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
