//! Common trait definitions
//!
//! Seams for the process environment and the filesystem, so configuration
//! can be loaded from explicit sources and tested without touching global
//! state.

use anyhow::Result;
use std::path::Path;

/// Read-only source of environment variables
///
/// Production code uses `ProcessEnv`; tests pass a `HashMap`.
pub trait EnvSource {
    /// Value of `key`, or `None` when unset or not valid Unicode
    fn var(&self, key: &str) -> Option<String>;
}

/// Trait for file system operations
///
/// Production code uses `StdFileStore`, tests can use mock implementations.
pub trait FileStore: Send + Sync {
    /// Read a file, `None` if it does not exist
    fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Write content to a file
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Create directory
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}
