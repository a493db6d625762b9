//! Construction options for [`super::EditorWindow`].

use crate::fileio::FilePath;
use log::error;
use std::rc::Rc;
use std::time::Duration;

/// Main window template, relative to the resources directory.
pub const MAIN_WINDOW_TEMPLATE: &str = "ui/main_window.json";

/// Delay between window construction and the session restore.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(200);

/// Called when the window cannot start at all.
///
/// The default handler terminates the process. Tests replace it with a
/// recorder.
pub type FatalHandler = Rc<dyn Fn(&str)>;

/// Construction options for one editor window.
#[derive(Clone)]
pub struct WindowOptions {
    pub resources_dir: FilePath,
    pub startup_delay: Duration,
    pub fatal_handler: FatalHandler,
}

impl WindowOptions {
    pub fn new(resources_dir: FilePath) -> Self {
        Self {
            resources_dir,
            startup_delay: DEFAULT_STARTUP_DELAY,
            fatal_handler: Rc::new(|message: &str| {
                fatal_abort(message);
            }),
        }
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_fatal_handler(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.fatal_handler = Rc::new(handler);
        self
    }
}

/// Logs `message` and aborts the process.
pub fn fatal_abort(message: &str) -> ! {
    error!("event=fatal module=window status=error message={message}");
    log::logger().flush();
    eprintln!("pcbdesk: fatal: {message}");
    std::process::abort()
}
