//! Opened project and schematic handles.
//!
//! # Responsibility
//! - Turn a project file into a runtime project instance.
//! - Own the schematics and libraries that belong to that instance.
//!
//! # Invariants
//! - Every `OpenedProject` gets a fresh runtime `uuid`; two instances loaded
//!   from the same file are still different projects.
//! - Schematic handles are created once per instance and never replaced, so
//!   `schematic(i)` returns the same `Rc` for the lifetime of the project.

pub mod file;

pub use file::{ProjectError, ProjectFile, ProjectResult, PROJECT_FILE_EXTENSION};

use crate::fileio::FilePath;
use crate::library::LibraryGui;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Runtime identity of one opened project instance.
pub type ProjectInstanceId = Uuid;

/// A library loaded into an opened project.
#[derive(Debug)]
pub struct Library {
    name: String,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One schematic page of an opened project, as shown by the editor.
#[derive(Debug)]
pub struct SchematicGui {
    index: usize,
    name: String,
}

impl SchematicGui {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A project opened in the editor.
#[derive(Debug)]
pub struct OpenedProject {
    id: ProjectInstanceId,
    path: FilePath,
    name: String,
    schematics: Vec<Rc<SchematicGui>>,
    libraries: RefCell<Vec<Rc<Library>>>,
}

impl OpenedProject {
    /// Reads the project file at `path` into a new instance.
    pub fn load(path: &FilePath) -> ProjectResult<Rc<Self>> {
        let file = ProjectFile::read(path)?;
        let project = Self::from_file(path.clone(), file);
        info!(
            "event=project_load module=project status=ok project_id={} schematics={} libraries={}",
            project.id,
            project.schematics.len(),
            project.libraries.borrow().len()
        );
        Ok(project)
    }

    /// Builds an instance from already parsed content.
    pub fn from_file(path: FilePath, file: ProjectFile) -> Rc<Self> {
        let schematics = file
            .schematics
            .into_iter()
            .enumerate()
            .map(|(index, name)| Rc::new(SchematicGui { index, name }))
            .collect();
        let libraries = file
            .libraries
            .into_iter()
            .map(|name| Rc::new(Library::new(name)))
            .collect();
        Rc::new(Self {
            id: Uuid::new_v4(),
            path,
            name: file.name,
            schematics,
            libraries: RefCell::new(libraries),
        })
    }

    pub fn id(&self) -> ProjectInstanceId {
        self.id
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schematics(&self) -> &[Rc<SchematicGui>] {
        &self.schematics
    }

    pub fn schematic(&self, index: usize) -> Option<Rc<SchematicGui>> {
        self.schematics.get(index).cloned()
    }

    pub fn libraries(&self) -> Vec<Rc<Library>> {
        self.libraries.borrow().clone()
    }

    /// Drops the project's handle to a library.
    ///
    /// Returns `false` when no library with that name is loaded.
    pub fn unload_library(&self, name: &str) -> bool {
        let removed = {
            let mut libraries = self.libraries.borrow_mut();
            libraries
                .iter()
                .position(|library| library.name() == name)
                .map(|index| libraries.remove(index))
        };
        match removed {
            Some(library) => {
                info!(
                    "event=library_unload module=project status=ok project_id={} library={}",
                    self.id,
                    library.name()
                );
                true
            }
            None => false,
        }
    }

    /// Presentation adapters for every loaded library.
    pub fn library_guis(self: &Rc<Self>) -> Vec<LibraryGui> {
        self.libraries()
            .iter()
            .map(|library| LibraryGui::new(self, library))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{OpenedProject, ProjectFile};
    use crate::fileio::FilePath;
    use std::rc::Rc;

    fn sample() -> Rc<OpenedProject> {
        let mut file = ProjectFile::new("Blinky");
        file.schematics.push("Power".to_string());
        file.libraries = vec!["Base".to_string(), "Connectors".to_string()];
        OpenedProject::from_file(FilePath::invalid(), file)
    }

    #[test]
    fn schematic_handles_are_stable() {
        let project = sample();
        let first = project.schematic(1).expect("second schematic");
        let again = project.schematic(1).expect("second schematic");
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(first.name(), "Power");
        assert_eq!(first.index(), 1);
        assert!(project.schematic(2).is_none());
    }

    #[test]
    fn instances_of_same_content_have_distinct_ids() {
        assert_ne!(sample().id(), sample().id());
    }

    #[test]
    fn unload_library_removes_only_named_entry() {
        let project = sample();
        assert!(project.unload_library("Base"));
        assert!(!project.unload_library("Base"));
        let names: Vec<String> = project
            .libraries()
            .iter()
            .map(|library| library.name().to_string())
            .collect();
        assert_eq!(names, vec!["Connectors".to_string()]);
    }
}
