#![allow(dead_code)]

use pcbdesk_core::{
    ContextObject, EditorApplication, EditorWindow, EventLoop, FilePath, ManualClock,
    ObjectCreated, OpenedProject, ProjectFile, Signal, SqliteSettingsStore, TemplateEngine,
    WindowOptions,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// Application double whose answers are queued by the test.
#[derive(Default)]
pub struct ScriptedApplication {
    pub create_results: RefCell<VecDeque<Option<Rc<OpenedProject>>>>,
    pub open_results: RefCell<VecDeque<Option<Rc<OpenedProject>>>>,
    pub openable: RefCell<Vec<(FilePath, Rc<OpenedProject>)>>,
    pub open_at_requests: RefCell<Vec<FilePath>>,
    pub workspace: FilePath,
}

impl ScriptedApplication {
    pub fn with_workspace(workspace: FilePath) -> Self {
        Self {
            workspace,
            ..Self::default()
        }
    }

    pub fn queue_create(&self, result: Option<Rc<OpenedProject>>) {
        self.create_results.borrow_mut().push_back(result);
    }

    pub fn queue_open(&self, result: Option<Rc<OpenedProject>>) {
        self.open_results.borrow_mut().push_back(result);
    }

    pub fn allow_open_at(&self, path: FilePath, project: Rc<OpenedProject>) {
        self.openable.borrow_mut().push((path, project));
    }
}

impl EditorApplication for ScriptedApplication {
    fn create_project(&self) -> Option<Rc<OpenedProject>> {
        self.create_results.borrow_mut().pop_front().flatten()
    }

    fn open_project(&self) -> Option<Rc<OpenedProject>> {
        self.open_results.borrow_mut().pop_front().flatten()
    }

    fn open_project_at(&self, path: &FilePath) -> Option<Rc<OpenedProject>> {
        self.open_at_requests.borrow_mut().push(path.clone());
        self.openable
            .borrow()
            .iter()
            .find(|(candidate, _)| candidate == path)
            .map(|(_, project)| project.clone())
    }

    fn workspace_path(&self) -> FilePath {
        self.workspace.clone()
    }

    fn version(&self) -> String {
        "1.2.3".to_string()
    }
}

/// Test-side view into a [`ScriptedEngine`] owned by a window.
#[derive(Clone, Default)]
pub struct EngineProbe {
    pub created: Rc<Signal<ObjectCreated>>,
    pub bindings: Rc<RefCell<BTreeMap<String, ContextObject>>>,
    pub loads: Rc<RefCell<Vec<FilePath>>>,
}

impl EngineProbe {
    pub fn report(&self, url: &FilePath, succeeded: bool) {
        let object = succeeded.then(|| {
            Rc::new(pcbdesk_core::TemplateObject {
                component: "Probe".to_string(),
                url: url.clone(),
                bindings: self.bindings.borrow().keys().cloned().collect(),
                imports: Vec::new(),
            })
        });
        self.created.emit(&ObjectCreated {
            object,
            url: url.clone(),
        });
    }
}

/// Engine double that records requests and reports only when told to.
pub struct ScriptedEngine {
    probe: EngineProbe,
}

impl ScriptedEngine {
    pub fn new(probe: &EngineProbe) -> Self {
        Self {
            probe: probe.clone(),
        }
    }
}

impl TemplateEngine for ScriptedEngine {
    fn set_context_property(&mut self, name: &str, object: ContextObject) {
        self.probe
            .bindings
            .borrow_mut()
            .insert(name.to_string(), object);
    }

    fn context_property(&self, name: &str) -> Option<ContextObject> {
        self.probe.bindings.borrow().get(name).cloned()
    }

    fn load(&mut self, url: &FilePath) {
        self.probe.loads.borrow_mut().push(url.clone());
    }

    fn object_created(&self) -> &Signal<ObjectCreated> {
        &self.probe.created
    }
}

pub struct Harness {
    pub event_loop: EventLoop,
    pub clock: Rc<ManualClock>,
    pub app: Rc<ScriptedApplication>,
    pub settings: Rc<SqliteSettingsStore>,
    pub engine: EngineProbe,
    pub fatal: Rc<RefCell<Vec<String>>>,
    pub window: Rc<EditorWindow>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ScriptedApplication::with_workspace(workspace_dir()), |_| {})
    }

    /// Builds a window after `prepare` had a chance to seed the settings.
    pub fn with(app: ScriptedApplication, prepare: impl FnOnce(&SqliteSettingsStore)) -> Self {
        let clock = Rc::new(ManualClock::new());
        let event_loop = EventLoop::with_clock(clock.clone());
        let app = Rc::new(app);
        let settings = Rc::new(SqliteSettingsStore::open_in_memory().expect("in-memory settings"));
        prepare(&settings);
        let engine = EngineProbe::default();
        let fatal = Rc::new(RefCell::new(Vec::new()));
        let fatal_sink = fatal.clone();

        let window = EditorWindow::new(
            app.clone(),
            settings.clone(),
            Box::new(ScriptedEngine::new(&engine)),
            &event_loop,
            WindowOptions::new(resources_dir())
                .with_fatal_handler(move |message| fatal_sink.borrow_mut().push(message.to_string())),
        );

        Self {
            event_loop,
            clock,
            app,
            settings,
            engine,
            fatal,
            window,
        }
    }

    /// Advances the clock by `ms` and runs one turn.
    pub fn tick(&self, ms: u64) {
        self.clock.advance(std::time::Duration::from_millis(ms));
        self.event_loop.process_events();
    }
}

/// Records window notifications in emission order.
pub fn record_notifications(window: &EditorWindow) -> Rc<RefCell<Vec<&'static str>>> {
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

pub fn sample_project(name: &str) -> Rc<OpenedProject> {
    let mut file = ProjectFile::new(name);
    file.schematics.push("Power".to_string());
    file.libraries.push("Base".to_string());
    OpenedProject::from_file(FilePath::invalid(), file)
}

pub fn resources_dir() -> FilePath {
    FilePath::from_path(std::env::temp_dir().join("pcbdesk-test-resources"))
}

pub fn workspace_dir() -> FilePath {
    FilePath::from_path(std::env::temp_dir().join("pcbdesk-test-workspace"))
}
