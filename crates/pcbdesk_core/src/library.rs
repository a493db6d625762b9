//! Presentation adapter for a project library.
//!
//! # Responsibility
//! - Expose the display name of a library without handing out the library.
//!
//! # Invariants
//! - The adapter never keeps the library or its project alive.
//! - Once the library is gone, `name()` returns an empty string.
//! - Any future path that changes the name must emit `name_changed`.

use crate::project::{Library, OpenedProject};
use crate::signal::Signal;
use std::rc::{Rc, Weak};

/// Read-only observable view of one library.
pub struct LibraryGui {
    project: Weak<OpenedProject>,
    library: Weak<Library>,
    name_changed: Signal<String>,
}

impl LibraryGui {
    pub fn new(project: &Rc<OpenedProject>, library: &Rc<Library>) -> Self {
        Self {
            project: Rc::downgrade(project),
            library: Rc::downgrade(library),
            name_changed: Signal::new(),
        }
    }

    /// Library display name, or "" when the library no longer exists.
    pub fn name(&self) -> String {
        self.library
            .upgrade()
            .map(|library| library.name().to_string())
            .unwrap_or_default()
    }

    pub fn is_alive(&self) -> bool {
        self.library.strong_count() > 0
    }

    /// The project this library was loaded into, while it is still open.
    pub fn project(&self) -> Option<Rc<OpenedProject>> {
        self.project.upgrade()
    }

    pub fn name_changed(&self) -> &Signal<String> {
        &self.name_changed
    }
}
