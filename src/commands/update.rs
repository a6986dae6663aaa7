//! `mcpkg update` - re-install every user-requested mod, then clean up
//! dependency drift.
//!
//! A new version of a mod may drop dependencies its old version needed;
//! the orphan sweep after the re-install removes what nothing references
//! any more.

use anyhow::Result;
use std::path::Path;

use super::install::{InstallOptions, InstallOutcome, install};
use super::join_slugs;
use crate::catalog::Catalog;
use crate::download;
use crate::http::HttpClient;
use crate::index::IndexStore;
use crate::removal::orphan;
use crate::runtime::Runtime;

#[tracing::instrument(skip(runtime, catalog, http))]
pub async fn update<R: Runtime>(
    runtime: &R,
    catalog: &dyn Catalog,
    http: &HttpClient,
    project_dir: &Path,
) -> Result<InstallOutcome> {
    let store = IndexStore::new(runtime, project_dir);
    let user_slugs = store.load()?.user_slugs();

    if user_slugs.is_empty() {
        println!("Nothing to update");
        return Ok(InstallOutcome::default());
    }

    let outcome = install(
        runtime,
        catalog,
        http,
        project_dir,
        user_slugs,
        InstallOptions::default(),
    )
    .await?;

    // Fresh snapshot: install just rewrote the index.
    let mut index = store.load()?;
    let removed = orphan::sweep(&mut index);
    store.save(&index)?;

    let mods_dir = download::mods_dir(project_dir);
    for slug in &removed {
        download::remove_jars(runtime, &mods_dir, slug)?;
    }

    if !removed.is_empty() {
        println!("Removed {}", join_slugs(&removed));
    }
    Ok(outcome)
}
