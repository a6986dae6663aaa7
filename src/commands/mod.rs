//! CLI command implementations.
//!
//! Thin orchestration over the index store, resolver, removal planner, and
//! downloader. Commands produce the slug sets and flags the engine
//! consumes, and report every changed or failed slug by name.

pub mod autoremove;
pub mod init;
pub mod install;
pub mod remove;
pub mod search;
pub mod update;

use anyhow::Result;
use std::path::Path;

use crate::runtime::Runtime;

/// Newline-separated slugs; blank lines and surrounding whitespace ignored.
fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Combine command-line slugs with an optional requirements file. Fails if
/// the combined set is empty or the file is missing.
pub(crate) fn collect_slugs<R: Runtime>(
    runtime: &R,
    mut slugs: Vec<String>,
    requirements: Option<&Path>,
) -> Result<Vec<String>> {
    if let Some(path) = requirements {
        if !runtime.exists(path) {
            anyhow::bail!("requirements file {:?} does not exist", path);
        }
        let content = runtime.read_to_string(path)?;
        slugs.extend(parse_requirements(&content));
    }

    if slugs.is_empty() {
        anyhow::bail!("slugs or a requirements file must be passed as an argument");
    }
    Ok(slugs)
}

fn join_slugs<'a, I: IntoIterator<Item = &'a String>>(slugs: I) -> String {
    let joined: Vec<&str> = slugs.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "nothing".to_string()
    } else {
        joined.join(", ")
    }
}
