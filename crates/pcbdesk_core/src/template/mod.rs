//! Declarative UI template engine contract.
//!
//! # Responsibility
//! - Describe what the window needs from a template engine: named context
//!   bindings, asynchronous loading, and a completion signal.
//!
//! # Invariants
//! - `load` never reports completion synchronously; results arrive through
//!   `object_created` on a later event loop turn.
//! - A completion with `object: None` means the template at `url` could not
//!   be instantiated.

mod resource_engine;

pub use resource_engine::ResourceTemplateEngine;

use crate::application::EditorApplication;
use crate::fileio::FilePath;
use crate::signal::Signal;
use crate::window::EditorWindow;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Host object made visible to templates under a context name.
#[derive(Clone)]
pub enum ContextObject {
    Application(Rc<dyn EditorApplication>),
    /// Held weakly: the window owns the engine, not the other way round.
    Window(Weak<EditorWindow>),
}

impl Debug for ContextObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application(_) => f.write_str("ContextObject::Application"),
            Self::Window(window) => write!(
                f,
                "ContextObject::Window(alive={})",
                window.strong_count() > 0
            ),
        }
    }
}

/// Instantiated template component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateObject {
    pub component: String,
    pub url: FilePath,
    /// Context names that were registered when the component was created.
    pub bindings: Vec<String>,
    /// Components imported successfully by this one.
    pub imports: Vec<String>,
}

/// Completion report for one loaded template file.
#[derive(Debug, Clone)]
pub struct ObjectCreated {
    pub object: Option<Rc<TemplateObject>>,
    pub url: FilePath,
}

/// Template engine contract used by the editor window.
pub trait TemplateEngine {
    fn set_context_property(&mut self, name: &str, object: ContextObject);
    fn context_property(&self, name: &str) -> Option<ContextObject>;

    /// Starts loading the template at `url`.
    fn load(&mut self, url: &FilePath);

    fn object_created(&self) -> &Signal<ObjectCreated>;
}
