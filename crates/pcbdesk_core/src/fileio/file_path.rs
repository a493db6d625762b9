//! Absolute, normalized filesystem path value.
//!
//! # Responsibility
//! - Turn untrusted path strings (settings, FFI input) into a checked value.
//! - Provide the small set of path helpers used by resources and projects.
//!
//! # Invariants
//! - A valid `FilePath` is absolute and lexically normalized.
//! - An invalid `FilePath` never touches the filesystem and displays as "".

use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Filesystem path that is either valid (absolute, normalized) or invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilePath {
    path: Option<PathBuf>,
}

impl FilePath {
    /// Parses a raw path string.
    ///
    /// Empty, whitespace-only and relative inputs produce an invalid path.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Self::invalid();
        }
        Self::from_path(Path::new(trimmed))
    }

    /// Builds from an already split path; relative paths are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Self::invalid();
        }
        Self {
            path: Some(normalize(path)),
        }
    }

    pub fn invalid() -> Self {
        Self { path: None }
    }

    pub fn is_valid(&self) -> bool {
        self.path.is_some()
    }

    pub fn as_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolves `relative` below this path.
    ///
    /// Returns an invalid path when `self` is invalid or `relative` is
    /// absolute.
    pub fn path_to(&self, relative: impl AsRef<Path>) -> Self {
        let relative = relative.as_ref();
        match &self.path {
            Some(base) if !relative.is_absolute() => Self {
                path: Some(normalize(&base.join(relative))),
            },
            _ => Self::invalid(),
        }
    }

    pub fn parent(&self) -> Self {
        match self.path.as_deref().and_then(Path::parent) {
            Some(parent) => Self {
                path: Some(parent.to_path_buf()),
            },
            None => Self::invalid(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.as_deref()?.file_name()?.to_str()
    }

    pub fn file_stem(&self) -> Option<&str> {
        self.path.as_deref()?.file_stem()?.to_str()
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.as_deref()?.extension()?.to_str()
    }

    pub fn is_existing_file(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_file)
    }

    pub fn is_existing_dir(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_dir)
    }
}

impl Display for FilePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display()),
            None => Ok(()),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root.
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
