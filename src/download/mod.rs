//! Jar downloads, deduplicated by file fingerprint.
//!
//! A jar lands at `<mods>/<slug>~<fingerprint>.jar`. If that exact file is
//! already present the download is skipped; stale fingerprints of the same
//! slug are deleted first. Bytes stream into a temporary path that is
//! renamed into place only once complete.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::catalog::ModFile;
use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Directory for downloaded jars, relative to the project directory.
pub const MODS_DIR_NAME: &str = "mods";

/// `<slug>~<fingerprint>.jar`
fn jar_name(slug: &str, fingerprint: u64) -> String {
    format!("{}~{}.jar", slug, fingerprint)
}

/// True if `path` is a jar belonging to `slug` (any fingerprint).
fn is_jar_for(slug: &str, path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(&format!("{}~", slug)))
}

/// The jar directory for a project.
pub fn mods_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(MODS_DIR_NAME)
}

/// Delete every jar belonging to `slug`. Used before a fresh download and
/// when a record leaves the index.
pub fn remove_jars<R: Runtime>(runtime: &R, mods_dir: &Path, slug: &str) -> Result<()> {
    if !runtime.exists(mods_dir) {
        return Ok(());
    }
    for path in runtime.read_dir(mods_dir)? {
        if is_jar_for(slug, &path) {
            debug!("Removing stale jar {:?}", path);
            runtime.remove_file(&path)?;
        }
    }
    Ok(())
}

pub struct Downloader<'a, R: Runtime> {
    runtime: &'a R,
    http: HttpClient,
    mods_dir: PathBuf,
}

impl<'a, R: Runtime> Downloader<'a, R> {
    pub fn new(runtime: &'a R, http: HttpClient, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            http,
            mods_dir: mods_dir(&project_dir.into()),
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Fetch the jar for `slug`. Returns whether a new file was downloaded.
    #[tracing::instrument(skip(self, file))]
    pub async fn fetch(&self, slug: &str, file: &ModFile) -> Result<bool> {
        let dest = self.mods_dir.join(jar_name(slug, file.file_fingerprint));

        self.runtime.create_dir_all(&self.mods_dir)?;

        if self.runtime.exists(&dest) {
            info!("The latest version of {} already exists", slug);
            return Ok(false);
        }

        remove_jars(self.runtime, &self.mods_dir, slug)?;

        let url = file.download_url.as_deref().with_context(|| {
            format!(
                "'{}' has no download URL; the author has disabled third-party downloads",
                slug
            )
        })?;

        info!("Downloading {}...", slug);
        let temp_path = dest.with_extension("jar.part");
        self.http
            .download_file(url, || self.runtime.create_file(&temp_path))
            .await
            .with_context(|| format!("Failed to download '{}'", slug))?;
        self.runtime.rename(&temp_path, &dest)?;

        Ok(true)
    }
}
