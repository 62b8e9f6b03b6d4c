//! Environment and file store implementations
//!
//! Standard implementations of the traits in [`crate::traits`].

use crate::traits::{EnvSource, FileStore};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Reads variables from the current process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Standard filesystem implementation
///
/// Implements the FileStore trait using the standard library's `std::fs` module.
pub struct StdFileStore;

impl FileStore for StdFileStore {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {:?}", path))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).with_context(|| format!("Failed to write to {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_file_store_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("dir");

        StdFileStore.create_dir_all(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_std_file_store_writes_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("out.txt");

        StdFileStore.write(&file, "test content").unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "test content");
    }

    #[test]
    fn test_std_file_store_reads_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("in.txt");

        assert_eq!(StdFileStore.read(&file).unwrap(), None);

        std::fs::write(&file, "hello").unwrap();
        assert_eq!(StdFileStore.read(&file).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_map_env_source() {
        let mut vars = HashMap::new();
        vars.insert("API_URL".to_string(), "https://example.test".to_string());

        assert_eq!(vars.var("API_URL").as_deref(), Some("https://example.test"));
        assert_eq!(vars.var("MISSING"), None);
    }

    #[test]
    fn test_process_env_missing_var() {
        assert_eq!(ProcessEnv.var("RCLKIT_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
