//! Runtime abstraction for system operations.
//!
//! A trait-based seam over the process environment and the file system,
//! enabling dependency injection and testability. Production code uses
//! [`RealRuntime`]; tests use the generated `MockRuntime`.

use anyhow::{Context, Result};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File system
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Create (or truncate) a file and return a writer for streaming content
    /// into it. Used by the downloader so tests can substitute a sink.
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        std_env::var(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std_env::current_dir().context("Failed to determine current directory")
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("Failed to list {:?}", path))? {
            entries.push(entry?.path());
        }
        entries.sort();
        Ok(entries)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        let file =
            fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        let runtime = RealRuntime;

        assert!(!runtime.exists(&path));
        runtime.write(&path, b"hello").unwrap();
        assert!(runtime.exists(&path));
        assert_eq!(runtime.read_to_string(&path).unwrap(), "hello");

        let renamed = dir.path().join("renamed.txt");
        runtime.rename(&path, &renamed).unwrap();
        assert!(!runtime.exists(&path));
        assert_eq!(runtime.read_to_string(&renamed).unwrap(), "hello");

        runtime.remove_file(&renamed).unwrap();
        assert!(!runtime.exists(&renamed));
    }

    #[test]
    fn test_real_runtime_read_dir_sorted() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        runtime.write(&dir.path().join("b.jar"), b"").unwrap();
        runtime.write(&dir.path().join("a.jar"), b"").unwrap();

        let entries = runtime.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("a.jar"));
        assert!(entries[1].ends_with("b.jar"));
    }
}
