//! `mcpkg remove` - reference-counted removal of records and jars.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{collect_slugs, join_slugs};
use crate::download;
use crate::index::IndexStore;
use crate::removal::execute_removal;
use crate::runtime::Runtime;

#[tracing::instrument(skip(runtime))]
pub fn remove<R: Runtime>(
    runtime: &R,
    project_dir: &Path,
    slugs: Vec<String>,
    requirements: Option<PathBuf>,
) -> Result<()> {
    let slugs = collect_slugs(runtime, slugs, requirements.as_deref())?;

    let store = IndexStore::new(runtime, project_dir);
    let mut index = store.load()?;

    // Plan and apply against the snapshot, then one atomic save.
    let deleted = execute_removal(&mut index, &slugs)?;
    store.save(&index)?;

    let mods_dir = download::mods_dir(project_dir);
    for slug in &deleted {
        download::remove_jars(runtime, &mods_dir, slug)?;
    }

    println!("Removed {}", join_slugs(&deleted));
    Ok(())
}
