//! On-disk project file (`*.pcbproj`).
//!
//! # Invariants
//! - `format` equals [`PROJECT_FILE_FORMAT`].
//! - Project, schematic and library names are non-empty after trimming.
//! - Creating a project never overwrites an existing file.

use crate::fileio::FilePath;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::Write;

pub const PROJECT_FILE_EXTENSION: &str = "pcbproj";
pub const PROJECT_FILE_FORMAT: u32 = 1;
pub const DEFAULT_SCHEMATIC_NAME: &str = "Main";

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(Debug)]
pub enum ProjectError {
    NotAProjectFile(FilePath),
    AlreadyExists(FilePath),
    Io {
        path: FilePath,
        source: std::io::Error,
    },
    Parse {
        path: FilePath,
        source: serde_json::Error,
    },
    UnsupportedFormat(u32),
    Invalid(String),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAProjectFile(path) => write!(f, "not a project file: `{path}`"),
            Self::AlreadyExists(path) => write!(f, "project file already exists: `{path}`"),
            Self::Io { path, source } => write!(f, "cannot access `{path}`: {source}"),
            Self::Parse { path, source } => write!(f, "cannot parse `{path}`: {source}"),
            Self::UnsupportedFormat(found) => write!(
                f,
                "project format {found} is not supported (expected {PROJECT_FILE_FORMAT})"
            ),
            Self::Invalid(message) => write!(f, "invalid project: {message}"),
        }
    }
}

impl Error for ProjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Serialized shape of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub format: u32,
    pub name: String,
    #[serde(default)]
    pub schematics: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
}

impl ProjectFile {
    /// Skeleton for a freshly created project: one default schematic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format: PROJECT_FILE_FORMAT,
            name: name.into(),
            schematics: vec![DEFAULT_SCHEMATIC_NAME.to_string()],
            libraries: Vec::new(),
        }
    }

    pub fn validate(&self) -> ProjectResult<()> {
        if self.format != PROJECT_FILE_FORMAT {
            return Err(ProjectError::UnsupportedFormat(self.format));
        }
        if self.name.trim().is_empty() {
            return Err(ProjectError::Invalid("project name is empty".to_string()));
        }
        if self.schematics.iter().any(|name| name.trim().is_empty()) {
            return Err(ProjectError::Invalid("schematic name is empty".to_string()));
        }
        if self.libraries.iter().any(|name| name.trim().is_empty()) {
            return Err(ProjectError::Invalid("library name is empty".to_string()));
        }
        Ok(())
    }

    /// Reads and validates the project file at `path`.
    pub fn read(path: &FilePath) -> ProjectResult<Self> {
        ensure_project_extension(path)?;
        let fs_path = path
            .as_path()
            .ok_or_else(|| ProjectError::NotAProjectFile(path.clone()))?;
        let raw = std::fs::read_to_string(fs_path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        let file: Self = serde_json::from_str(&raw).map_err(|source| ProjectError::Parse {
            path: path.clone(),
            source,
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Writes this project to a file that must not exist yet.
    pub fn write_new(&self, path: &FilePath) -> ProjectResult<()> {
        self.validate()?;
        ensure_project_extension(path)?;
        let fs_path = path
            .as_path()
            .ok_or_else(|| ProjectError::NotAProjectFile(path.clone()))?;
        let io_error = |source: std::io::Error| ProjectError::Io {
            path: path.clone(),
            source,
        };

        let mut handle = match OpenOptions::new().write(true).create_new(true).open(fs_path) {
            Ok(handle) => handle,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ProjectError::AlreadyExists(path.clone()));
            }
            Err(err) => return Err(io_error(err)),
        };
        let body = serde_json::to_string_pretty(self).map_err(|source| ProjectError::Parse {
            path: path.clone(),
            source,
        })?;
        handle.write_all(body.as_bytes()).map_err(io_error)?;
        handle.write_all(b"\n").map_err(io_error)?;
        Ok(())
    }
}

fn ensure_project_extension(path: &FilePath) -> ProjectResult<()> {
    if path.is_valid() && path.extension() == Some(PROJECT_FILE_EXTENSION) {
        Ok(())
    } else {
        Err(ProjectError::NotAProjectFile(path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectError, ProjectFile, DEFAULT_SCHEMATIC_NAME};
    use crate::fileio::FilePath;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> FilePath {
        FilePath::from_path(dir.path().join(name))
    }

    #[test]
    fn new_project_has_default_schematic() {
        let file = ProjectFile::new("Blinky");
        assert_eq!(file.schematics, vec![DEFAULT_SCHEMATIC_NAME.to_string()]);
        file.validate().expect("skeleton project is valid");
    }

    #[test]
    fn write_then_read_keeps_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = temp_path(&dir, "blinky.pcbproj");
        let mut file = ProjectFile::new("Blinky");
        file.libraries.push("Base".to_string());

        file.write_new(&path).expect("write project");
        assert_eq!(ProjectFile::read(&path).expect("read project"), file);
    }

    #[test]
    fn write_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = temp_path(&dir, "blinky.pcbproj");
        ProjectFile::new("Blinky").write_new(&path).expect("first write");

        let err = ProjectFile::new("Other")
            .write_new(&path)
            .expect_err("second write must fail");
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn read_rejects_wrong_extension_and_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let wrong_ext = temp_path(&dir, "notes.txt");
        std::fs::write(wrong_ext.as_path().expect("valid path"), "{}").expect("write");
        assert!(matches!(
            ProjectFile::read(&wrong_ext),
            Err(ProjectError::NotAProjectFile(_))
        ));

        let future = temp_path(&dir, "future.pcbproj");
        std::fs::write(
            future.as_path().expect("valid path"),
            r#"{"format": 9, "name": "Future"}"#,
        )
        .expect("write");
        assert!(matches!(
            ProjectFile::read(&future),
            Err(ProjectError::UnsupportedFormat(9))
        ));
    }

    #[test]
    fn read_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = temp_path(&dir, "broken.pcbproj");
        std::fs::write(broken.as_path().expect("valid path"), "not json").expect("write");
        assert!(matches!(
            ProjectFile::read(&broken),
            Err(ProjectError::Parse { .. })
        ));
    }
}
