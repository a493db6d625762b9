use super::{EditorWindow, WindowOptions};
use crate::application::EditorApplication;
use crate::event_loop::{EventLoop, ManualClock};
use crate::fileio::FilePath;
use crate::project::{OpenedProject, ProjectFile, SchematicGui};
use crate::settings::SqliteSettingsStore;
use crate::signal::Signal;
use crate::template::{ContextObject, ObjectCreated, TemplateEngine};
use std::cell::RefCell;
use std::rc::Rc;

struct IdleApplication;

impl EditorApplication for IdleApplication {
    fn create_project(&self) -> Option<Rc<OpenedProject>> {
        None
    }

    fn open_project(&self) -> Option<Rc<OpenedProject>> {
        None
    }

    fn open_project_at(&self, _path: &FilePath) -> Option<Rc<OpenedProject>> {
        None
    }

    fn workspace_path(&self) -> FilePath {
        FilePath::invalid()
    }

    fn version(&self) -> String {
        "0.0.0-test".to_string()
    }
}

#[derive(Default)]
struct SilentEngine {
    created: Signal<ObjectCreated>,
}

impl TemplateEngine for SilentEngine {
    fn set_context_property(&mut self, _name: &str, _object: ContextObject) {}

    fn context_property(&self, _name: &str) -> Option<ContextObject> {
        None
    }

    fn load(&mut self, _url: &FilePath) {}

    fn object_created(&self) -> &Signal<ObjectCreated> {
        &self.created
    }
}

fn window() -> Rc<EditorWindow> {
    let event_loop = EventLoop::with_clock(Rc::new(ManualClock::new()));
    let settings = SqliteSettingsStore::open_in_memory().expect("in-memory settings");
    EditorWindow::new(
        Rc::new(IdleApplication),
        Rc::new(settings),
        Box::new(SilentEngine::default()),
        &event_loop,
        WindowOptions::new(FilePath::invalid()).with_fatal_handler(|_| {}),
    )
}

fn project(name: &str) -> Rc<OpenedProject> {
    let mut file = ProjectFile::new(name);
    file.schematics.push("Power".to_string());
    OpenedProject::from_file(FilePath::invalid(), file)
}

fn record(window: &EditorWindow) -> Rc<RefCell<Vec<&'static str>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    window
        .current_project_changed()
        .connect(move |_| sink.borrow_mut().push("project"));
    let sink = events.clone();
    window
        .current_schematic_changed()
        .connect(move |_| sink.borrow_mut().push("schematic"));
    events
}

#[test]
fn same_project_twice_notifies_once() {
    let window = window();
    let events = record(&window);
    let a = project("A");

    window.set_current_project(Some(a.clone()));
    window.set_current_project(Some(a.clone()));

    assert_eq!(*events.borrow(), vec!["project"]);
    assert!(Rc::ptr_eq(&window.current_project().expect("project"), &a));
}

#[test]
fn clearing_empty_project_is_a_no_op() {
    let window = window();
    let events = record(&window);

    window.set_current_project(None);
    window.set_current_schematic(None);

    assert!(events.borrow().is_empty());
}

#[test]
fn project_switch_clears_schematic_before_project_changes() {
    let window = window();
    let a = project("A");
    window.set_current_project(Some(a.clone()));
    window.set_current_schematic(a.schematic(0));
    let events = record(&window);

    window.set_current_project(Some(project("B")));

    assert_eq!(*events.borrow(), vec!["schematic", "project"]);
    assert!(window.current_schematic().is_none());
    assert_eq!(window.current_project().expect("project").name(), "B");
}

#[test]
fn equal_content_is_still_a_different_project() {
    let window = window();
    let events = record(&window);

    window.set_current_project(Some(project("Same")));
    window.set_current_project(Some(project("Same")));

    assert_eq!(*events.borrow(), vec!["project", "project"]);
}

#[test]
fn schematic_identity_decides_notification() {
    let window = window();
    let a = project("A");
    window.set_current_project(Some(a.clone()));
    let events = record(&window);

    window.set_current_schematic(a.schematic(0));
    window.set_current_schematic(a.schematic(0));
    window.set_current_schematic(a.schematic(1));

    assert_eq!(*events.borrow(), vec!["schematic", "schematic"]);
    assert_eq!(window.current_schematic().expect("schematic").name(), "Power");
}

#[test]
fn foreign_schematic_is_accepted_as_given() {
    let window = window();
    window.set_current_project(Some(project("A")));
    let foreign: Rc<SchematicGui> = project("B").schematic(0).expect("schematic");

    window.set_current_schematic(Some(foreign.clone()));

    assert!(Rc::ptr_eq(
        &window.current_schematic().expect("schematic"),
        &foreign
    ));
}

#[test]
fn slots_can_read_window_during_notification() {
    let window = window();
    let seen = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&window);
    let sink = seen.clone();
    window.current_project_changed().connect(move |_| {
        if let Some(window) = weak.upgrade() {
            *sink.borrow_mut() = window.current_project().map(|p| p.name().to_string());
        }
    });

    window.set_current_project(Some(project("A")));

    assert_eq!(seen.borrow().as_deref(), Some("A"));
}
