//! CLI smoke entry point.
//!
//! # Responsibility
//! - Start one editor window headless against a resources directory.
//! - Optionally open a project, then print what the window shows.
//!
//! Usage: `pcbdesk_cli <resources_dir> [project_file]`

use pcbdesk_core::{
    core_version, default_log_level, init_logging, EditorWindow, EventLoop, FilePath,
    ResourceTemplateEngine, SqliteSettingsStore, StagedPicker, WindowOptions,
    WorkspaceApplication,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

const SETTINGS_DB_ENV: &str = "PCBDESK_SETTINGS_DB";
const LOG_DIR_ENV: &str = "PCBDESK_LOG_DIR";
const STARTUP_BUDGET: Duration = Duration::from_millis(300);

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(resources_dir) = args.next() else {
        eprintln!("usage: pcbdesk_cli <resources_dir> [project_file]");
        return ExitCode::from(2);
    };
    let project_file = args.next();

    match run(&resources_dir, project_file.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pcbdesk_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(resources_dir: &str, project_file: Option<&str>) -> Result<(), String> {
    if let Some(log_dir) = env_value(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let cwd = std::env::current_dir().map_err(|err| format!("cannot read cwd: {err}"))?;
    let resources = FilePath::from_path(cwd.join(resources_dir));
    let settings_db = env_value(SETTINGS_DB_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("pcbdesk_settings.sqlite3"));

    let settings = Rc::new(
        SqliteSettingsStore::open(&settings_db)
            .map_err(|err| format!("cannot open settings `{}`: {err}", settings_db.display()))?,
    );
    let picker = Rc::new(StagedPicker::new());
    let application = Rc::new(WorkspaceApplication::new(
        FilePath::from_path(&cwd),
        settings.clone(),
        picker.clone(),
    ));
    let event_loop = EventLoop::new();
    let window = EditorWindow::new(
        application,
        settings,
        Box::new(ResourceTemplateEngine::new(&event_loop)),
        &event_loop,
        WindowOptions::new(resources),
    );

    event_loop.run_for(STARTUP_BUDGET);

    if let Some(project_file) = project_file {
        picker.stage(FilePath::from_path(cwd.join(project_file)));
        if !window.open_project() {
            log::warn!("event=project_open module=cli status=error path={project_file}");
            return Err(format!("cannot open project `{project_file}`"));
        }
    }

    print_window(&window);
    Ok(())
}

fn print_window(window: &EditorWindow) {
    println!("pcbdesk_core version={}", core_version());
    println!("title={}", window.title());
    match window.current_project() {
        Some(project) => {
            println!("project={} path={}", project.name(), project.path());
            for schematic in project.schematics() {
                println!("  schematic[{}]={}", schematic.index(), schematic.name());
            }
            for library in window.library_guis() {
                println!("  library={}", library.name());
            }
        }
        None => println!("project=<none>"),
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
