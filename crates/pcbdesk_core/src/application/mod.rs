//! Application collaborator used by editor windows.
//!
//! # Responsibility
//! - Create and open projects on behalf of a window.
//! - Keep at most one instance per project file open at a time.
//! - Record the last opened project in the settings store.
//!
//! # Invariants
//! - Every failure is logged and reported as `None`; windows decide what a
//!   missing project means for them.
//! - Opening a path that is already open returns the existing instance.

mod picker;

pub use picker::{ProjectPicker, StagedPicker};

use crate::fileio::FilePath;
use crate::project::{OpenedProject, ProjectFile, PROJECT_FILE_EXTENSION};
use crate::settings::{SettingsStore, LAST_OPEN_PROJECT_KEY};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Operations a window may request from the application.
pub trait EditorApplication {
    /// Creates a new project; the location is chosen interactively.
    fn create_project(&self) -> Option<Rc<OpenedProject>>;
    /// Opens an existing project chosen interactively.
    fn open_project(&self) -> Option<Rc<OpenedProject>>;
    fn open_project_at(&self, path: &FilePath) -> Option<Rc<OpenedProject>>;
    fn workspace_path(&self) -> FilePath;
    fn version(&self) -> String;
}

/// Application rooted in one workspace directory.
pub struct WorkspaceApplication {
    workspace: FilePath,
    settings: Rc<dyn SettingsStore>,
    picker: Rc<dyn ProjectPicker>,
    version: String,
    open_projects: RefCell<Vec<Weak<OpenedProject>>>,
}

impl WorkspaceApplication {
    pub fn new(
        workspace: FilePath,
        settings: Rc<dyn SettingsStore>,
        picker: Rc<dyn ProjectPicker>,
    ) -> Self {
        Self {
            workspace,
            settings,
            picker,
            version: crate::core_version().to_string(),
            open_projects: RefCell::new(Vec::new()),
        }
    }

    /// Number of project instances that are still referenced somewhere.
    pub fn open_project_count(&self) -> usize {
        self.prune();
        self.open_projects.borrow().len()
    }

    fn find_open(&self, path: &FilePath) -> Option<Rc<OpenedProject>> {
        self.open_projects
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|project| project.path() == path)
    }

    fn prune(&self) {
        self.open_projects
            .borrow_mut()
            .retain(|project| project.strong_count() > 0);
    }

    fn remember_last_project(&self, path: &FilePath) {
        if let Err(err) = self
            .settings
            .set_value(LAST_OPEN_PROJECT_KEY, &path.to_string())
        {
            warn!(
                "event=settings_write module=application status=error key={LAST_OPEN_PROJECT_KEY} error={err}"
            );
        }
    }
}

impl EditorApplication for WorkspaceApplication {
    fn create_project(&self) -> Option<Rc<OpenedProject>> {
        let Some(chosen) = self.picker.pick_new_project(&self.workspace) else {
            debug!("event=project_create module=application status=cancelled");
            return None;
        };
        let path = with_project_extension(&chosen);
        let name = path.file_stem().unwrap_or_default().to_string();

        if let Err(err) = ProjectFile::new(name).write_new(&path) {
            warn!("event=project_create module=application status=error path={path} error={err}");
            return None;
        }
        info!("event=project_create module=application status=ok path={path}");
        self.open_project_at(&path)
    }

    fn open_project(&self) -> Option<Rc<OpenedProject>> {
        let Some(path) = self.picker.pick_existing_project(&self.workspace) else {
            debug!("event=project_open module=application status=cancelled");
            return None;
        };
        self.open_project_at(&path)
    }

    fn open_project_at(&self, path: &FilePath) -> Option<Rc<OpenedProject>> {
        if let Some(project) = self.find_open(path) {
            debug!(
                "event=project_open module=application status=reused project_id={}",
                project.id()
            );
            self.remember_last_project(path);
            return Some(project);
        }

        match OpenedProject::load(path) {
            Ok(project) => {
                self.prune();
                self.open_projects
                    .borrow_mut()
                    .push(Rc::downgrade(&project));
                self.remember_last_project(path);
                info!(
                    "event=project_open module=application status=ok project_id={} path={path}",
                    project.id()
                );
                Some(project)
            }
            Err(err) => {
                warn!("event=project_open module=application status=error path={path} error={err}");
                None
            }
        }
    }

    fn workspace_path(&self) -> FilePath {
        self.workspace.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

/// Appends `.pcbproj` unless the file name already ends with it; any other
/// extension stays part of the project name.
fn with_project_extension(path: &FilePath) -> FilePath {
    if path.extension() == Some(PROJECT_FILE_EXTENSION) {
        return path.clone();
    }
    match (path.as_path(), path.file_name()) {
        (Some(fs_path), Some(file_name)) => FilePath::from_path(
            fs_path.with_file_name(format!("{file_name}.{PROJECT_FILE_EXTENSION}")),
        ),
        _ => path.clone(),
    }
}
