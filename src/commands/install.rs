//! `mcpkg install` - resolve closures, persist records, download jars.

use anyhow::Result;
use futures_util::future::join_all;
use log::info;
use std::path::{Path, PathBuf};

use super::{collect_slugs, join_slugs};
use crate::catalog::{Catalog, ModLoader};
use crate::download::Downloader;
use crate::http::HttpClient;
use crate::index::IndexStore;
use crate::resolver::Resolver;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Override the game version stored in the index for this invocation.
    pub version: Option<String>,
    /// Override the mod loader stored in the index for this invocation.
    pub loader: Option<ModLoader>,
    /// Requirements file with additional slugs.
    pub requirements: Option<PathBuf>,
    /// Also follow optional dependencies.
    pub include_optional: bool,
}

/// What an install actually changed, for reporting and exit status.
#[derive(Debug, Default)]
pub struct InstallOutcome {
    pub installed: Vec<String>,
    pub failed_roots: Vec<String>,
    pub failed_downloads: Vec<String>,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        self.failed_roots.is_empty() && self.failed_downloads.is_empty()
    }
}

#[tracing::instrument(skip(runtime, catalog, http, options))]
pub async fn install<R: Runtime>(
    runtime: &R,
    catalog: &dyn Catalog,
    http: &HttpClient,
    project_dir: &Path,
    slugs: Vec<String>,
    options: InstallOptions,
) -> Result<InstallOutcome> {
    let store = IndexStore::new(runtime, project_dir);
    let mut index = store.load()?;

    let version = options
        .version
        .unwrap_or_else(|| index.version.clone());
    let loader = options.loader.unwrap_or(index.mod_loader);
    let slugs = collect_slugs(runtime, slugs, options.requirements.as_deref())?;

    let resolver = Resolver::new(catalog, &version, loader, options.include_optional);
    let resolution = resolver.resolve(&slugs).await?;

    // One snapshot save for the whole closure.
    resolution.apply_to(&mut index);
    store.save(&index)?;

    // Jar downloads are independent of each other; run them together and
    // account for every one before reporting.
    let downloader = Downloader::new(runtime, http.clone(), project_dir);
    let downloads = resolution.mods.iter().map(|(slug, resolved)| {
        let downloader = &downloader;
        async move { (slug.clone(), downloader.fetch(slug, &resolved.file).await) }
    });

    let mut outcome = InstallOutcome::default();
    for (slug, result) in join_all(downloads).await {
        match result {
            Ok(was_new) => {
                if was_new {
                    info!("Downloaded {}", slug);
                }
                outcome.installed.push(slug);
            }
            Err(e) => {
                eprintln!("error: failed to download '{}': {:#}", slug, e);
                outcome.failed_downloads.push(slug);
            }
        }
    }

    for failure in &resolution.failures {
        eprintln!(
            "error: failed to resolve '{}': {:#}",
            failure.root, failure.error
        );
        outcome.failed_roots.push(failure.root.clone());
    }

    println!("Installed {}", join_slugs(&outcome.installed));
    Ok(outcome)
}
