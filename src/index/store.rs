//! Durable storage for the package index.
//!
//! The index is one JSON file. Writes go to a temporary sibling and are
//! renamed into place, so a crash mid-write never leaves a truncated index
//! visible.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{IndexFile, ModRecord};
use crate::catalog::ModLoader;
use crate::error::McpkgError;
use crate::runtime::Runtime;

/// File name of the package index, relative to the project directory.
pub const INDEX_FILE_NAME: &str = "mcpkg.json";

pub struct IndexStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> IndexStore<'a, R> {
    /// Store for the index file inside `project_dir`.
    pub fn new(runtime: &'a R, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            path: project_dir.into().join(INDEX_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    /// Create a fresh, empty index. Refuses to touch an existing one.
    pub fn initialize(&self, version: &str, mod_loader: ModLoader) -> Result<IndexFile> {
        if self.exists() {
            return Err(McpkgError::AlreadyExists(self.path.display().to_string()).into());
        }
        let index = IndexFile::new(version, mod_loader);
        self.save(&index)?;
        Ok(index)
    }

    /// Load the whole index as a snapshot.
    pub fn load(&self) -> Result<IndexFile> {
        if !self.exists() {
            return Err(McpkgError::NotInitialized(self.path.display().to_string()).into());
        }
        let raw = self.runtime.read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            McpkgError::MalformedIndex {
                path: self.path.display().to_string(),
                detail: e.to_string(),
            }
            .into()
        })
    }

    /// Persist a snapshot atomically (write-to-temp, then rename).
    pub fn save(&self, index: &IndexFile) -> Result<()> {
        let content = serde_json::to_string_pretty(index).context("Failed to serialize index")?;
        let temp_path = self.path.with_extension("json.tmp");
        self.runtime.write(&temp_path, content.as_bytes())?;
        self.runtime
            .rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace index at {:?}", self.path))
    }

    /// Create or overwrite a single record (read-modify-write).
    pub fn put(&self, slug: &str, record: ModRecord) -> Result<()> {
        let mut index = self.load()?;
        index.insert(slug, record);
        self.save(&index)
    }

    /// Delete a single record. Returns whether it was present.
    pub fn delete(&self, slug: &str) -> Result<bool> {
        let mut index = self.load()?;
        let removed = index.remove(slug).is_some();
        self.save(&index)?;
        Ok(removed)
    }
}
