//! File system value types.
//!
//! # Responsibility
//! - Validate path input before any component opens files.

pub mod file_path;

pub use file_path::FilePath;
