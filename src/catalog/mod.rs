//! Catalog abstraction for the remote mod registry.
//!
//! The [`Catalog`] trait is the lookup collaborator consumed by the
//! resolver and the search command. Production code uses the CurseForge
//! implementation; tests use the generated `MockCatalog`.

mod curseforge;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use curseforge::CurseForge;

/// File relation type for a required dependency.
pub const RELATION_REQUIRED: u32 = 3;
/// File relation type for an optional dependency.
pub const RELATION_OPTIONAL: u32 = 2;

/// Mod loader tag. Opaque to the graph engine; the catalog maps it to the
/// registry's numeric loader id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    #[default]
    Forge,
    Fabric,
}

impl ModLoader {
    /// CurseForge `modLoaderType` id.
    pub fn registry_id(&self) -> u32 {
        match self {
            ModLoader::Forge => 1,
            ModLoader::Fabric => 4,
        }
    }
}

impl fmt::Display for ModLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModLoader::Forge => write!(f, "forge"),
            ModLoader::Fabric => write!(f, "fabric"),
        }
    }
}

impl FromStr for ModLoader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forge" => Ok(ModLoader::Forge),
            "fabric" => Ok(ModLoader::Fabric),
            _ => anyhow::bail!("Unknown mod loader: {}. Expected forge or fabric.", s),
        }
    }
}

/// A mod as known to the remote catalog.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModInfo {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub download_count: Option<f64>,
}

/// A dependency declared by a specific mod file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDependency {
    pub mod_id: u64,
    pub relation_type: u32,
}

/// A specific downloadable build of a mod.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModFile {
    pub id: u64,
    pub file_name: String,
    /// Absent when the author has disallowed third-party distribution.
    #[serde(default)]
    pub download_url: Option<String>,
    pub file_fingerprint: u64,
    #[serde(default)]
    pub dependencies: Vec<FileDependency>,
}

/// Remote catalog lookup service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a slug to a mod. Fails with [`crate::error::McpkgError::ModNotFound`].
    async fn find_by_slug(&self, slug: &str) -> Result<ModInfo>;

    /// Latest file compatible with the game version and loader. Fails with
    /// [`crate::error::McpkgError::NoCompatibleFile`].
    async fn latest_file(
        &self,
        info: &ModInfo,
        game_version: &str,
        loader: ModLoader,
    ) -> Result<ModFile>;

    /// Direct dependency slugs of a file, required-only unless
    /// `include_optional`, in the order the file declares them.
    async fn direct_dependencies(
        &self,
        file: &ModFile,
        include_optional: bool,
    ) -> Result<Vec<String>>;

    /// Full-text search over the catalog.
    async fn search(&self, query: &str) -> Result<Vec<ModInfo>>;
}

/// Sort search results by relevance: mods whose name contains the full
/// query rank first. The sort is stable, so the catalog's own ordering is
/// kept within each bucket.
pub fn sort_by_relevance(mods: &mut [ModInfo], query: &str) {
    let query = query.to_lowercase();
    mods.sort_by_key(|m| {
        if m.name.to_lowercase().contains(&query) {
            0
        } else {
            1
        }
    });
}
