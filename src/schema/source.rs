//! Content source abstraction for reading schema and syntax files.

use camino::Utf8Path;

use crate::error::{Error, Result};

/// Trait for abstracting file I/O so loaders can be fed from memory in tests.
pub trait ContentSource {
    /// Read a file at the given logical path and return its content as a string.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
}

/// Reads files directly from the local filesystem.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path()).map_err(|e| Error::SourceUnavailable {
            path: Some(path.to_path_buf()),
            message: format!("Failed to read {}: {}", path, e),
        })
    }
}

impl<S: ContentSource + ?Sized> ContentSource for &mut S {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        (**self).read_to_string(path)
    }
}
