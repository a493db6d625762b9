//! Interactive project location choice.

use crate::fileio::FilePath;
use std::cell::RefCell;

/// Asks the user where to create a project or which one to open.
///
/// `None` means the user cancelled.
pub trait ProjectPicker {
    fn pick_new_project(&self, workspace: &FilePath) -> Option<FilePath>;
    fn pick_existing_project(&self, workspace: &FilePath) -> Option<FilePath>;
}

/// Picker whose answer is decided before the request is made.
///
/// Hosts that show their own file dialog (the Dart UI, the CLI) stage the
/// chosen path and then trigger the window operation. Each staged answer is
/// consumed by the next pick; with nothing staged the pick is a cancel.
#[derive(Debug, Default)]
pub struct StagedPicker {
    staged: RefCell<Option<FilePath>>,
}

impl StagedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, path: FilePath) {
        *self.staged.borrow_mut() = Some(path);
    }

    pub fn clear(&self) {
        self.staged.borrow_mut().take();
    }

    fn take(&self) -> Option<FilePath> {
        self.staged.borrow_mut().take().filter(FilePath::is_valid)
    }
}

impl ProjectPicker for StagedPicker {
    fn pick_new_project(&self, _workspace: &FilePath) -> Option<FilePath> {
        self.take()
    }

    fn pick_existing_project(&self, _workspace: &FilePath) -> Option<FilePath> {
        self.take()
    }
}
