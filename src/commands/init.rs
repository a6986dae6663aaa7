//! `mcpkg init` - create a fresh package index.

use anyhow::Result;
use std::path::Path;

use crate::catalog::ModLoader;
use crate::index::IndexStore;
use crate::runtime::Runtime;

/// Accepts Minecraft release versions like `1.19` or `1.19.2`.
fn is_valid_game_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts[0] == "1"
        && parts[1..]
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

pub fn init<R: Runtime>(
    runtime: &R,
    project_dir: &Path,
    version: &str,
    loader: ModLoader,
) -> Result<()> {
    if !is_valid_game_version(version) {
        anyhow::bail!("'{}' is not a valid Minecraft version", version);
    }

    let store = IndexStore::new(runtime, project_dir);
    store.initialize(version, loader)?;
    println!("Created {}", store.path().display());
    Ok(())
}
