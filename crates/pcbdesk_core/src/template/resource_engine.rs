//! Template engine backed by JSON template files in a resources directory.
//!
//! A template file looks like
//! `{"component": "MainWindow", "imports": ["components/toolbar.json"]}`.
//! Imports are resolved against the directory of the importing file and are
//! reported before the importing file itself. Imports are one level deep.

use super::{ContextObject, ObjectCreated, TemplateEngine, TemplateObject};
use crate::event_loop::EventLoop;
use crate::fileio::FilePath;
use crate::signal::Signal;
use log::{info, warn};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Deserialize)]
struct TemplateDocument {
    component: String,
    #[serde(default)]
    imports: Vec<String>,
}

pub struct ResourceTemplateEngine {
    event_loop: EventLoop,
    context: BTreeMap<String, ContextObject>,
    object_created: Rc<Signal<ObjectCreated>>,
    root_objects: Rc<RefCell<Vec<Rc<TemplateObject>>>>,
}

impl ResourceTemplateEngine {
    pub fn new(event_loop: &EventLoop) -> Self {
        Self {
            event_loop: event_loop.clone(),
            context: BTreeMap::new(),
            object_created: Rc::new(Signal::new()),
            root_objects: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Root components created so far, in load order.
    pub fn root_objects(&self) -> Vec<Rc<TemplateObject>> {
        self.root_objects.borrow().clone()
    }
}

impl TemplateEngine for ResourceTemplateEngine {
    fn set_context_property(&mut self, name: &str, object: ContextObject) {
        self.context.insert(name.to_string(), object);
    }

    fn context_property(&self, name: &str) -> Option<ContextObject> {
        self.context.get(name).cloned()
    }

    fn load(&mut self, url: &FilePath) {
        let url = url.clone();
        let bindings: Vec<String> = self.context.keys().cloned().collect();
        // Weak so a pending load does nothing once the engine is dropped.
        let signal = Rc::downgrade(&self.object_created);
        let roots = Rc::downgrade(&self.root_objects);
        info!("event=template_load module=template status=start url={url}");

        self.event_loop.post(move || {
            let Some(signal) = signal.upgrade() else {
                return;
            };
            for report in instantiate(&url, &bindings) {
                match (&report.object, roots.upgrade()) {
                    (Some(object), Some(roots)) if report.url == url => {
                        roots.borrow_mut().push(object.clone());
                    }
                    _ => {}
                }
                signal.emit(&report);
            }
        });
    }

    fn object_created(&self) -> &Signal<ObjectCreated> {
        &self.object_created
    }
}

/// Loads `url` and its imports; the root report comes last.
fn instantiate(url: &FilePath, bindings: &[String]) -> Vec<ObjectCreated> {
    let document = match read_document(url) {
        Ok(document) => document,
        Err(message) => {
            warn!("event=template_load module=template status=error url={url} error={message}");
            return vec![ObjectCreated {
                object: None,
                url: url.clone(),
            }];
        }
    };

    let base = url.parent();
    let mut reports = Vec::with_capacity(document.imports.len() + 1);
    let mut imported = Vec::new();
    for import in &document.imports {
        let import_url = base.path_to(import);
        match read_document(&import_url) {
            Ok(child) => {
                imported.push(child.component.clone());
                reports.push(ObjectCreated {
                    object: Some(Rc::new(TemplateObject {
                        component: child.component,
                        url: import_url.clone(),
                        bindings: bindings.to_vec(),
                        imports: Vec::new(),
                    })),
                    url: import_url,
                });
            }
            Err(message) => {
                warn!(
                    "event=template_load module=template status=error url={import_url} error={message}"
                );
                reports.push(ObjectCreated {
                    object: None,
                    url: import_url,
                });
            }
        }
    }

    info!(
        "event=template_load module=template status=ok url={url} component={} imports={}",
        document.component,
        imported.len()
    );
    reports.push(ObjectCreated {
        object: Some(Rc::new(TemplateObject {
            component: document.component,
            url: url.clone(),
            bindings: bindings.to_vec(),
            imports: imported,
        })),
        url: url.clone(),
    });
    reports
}

fn read_document(url: &FilePath) -> Result<TemplateDocument, String> {
    let path = url
        .as_path()
        .ok_or_else(|| "template path is not valid".to_string())?;
    let raw = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    let document: TemplateDocument = serde_json::from_str(&raw).map_err(|err| err.to_string())?;
    if document.component.trim().is_empty() {
        return Err("template component name is empty".to_string());
    }
    Ok(document)
}
