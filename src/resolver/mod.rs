//! Install-closure builder.
//!
//! Walks the remote dependency relation from a set of root slugs and
//! produces one tentative installation record per reachable mod. The walk
//! is iterative with a visited set, so diamonds resolve each shared node
//! exactly once and cycles terminate.

use anyhow::Result;
use log::{debug, info};
use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::catalog::{Catalog, ModFile, ModInfo, ModLoader};
use crate::error::McpkgError;
use crate::index::{IndexFile, ModRecord};

/// A mod resolved during closure building, with the file to download.
#[derive(Debug, Clone)]
pub struct ResolvedMod {
    pub info: ModInfo,
    pub file: ModFile,
    /// True when the user named this slug as a root.
    pub user_requested: bool,
    /// Direct dependency slugs, in the order the file declares them.
    pub dependencies: Vec<String>,
}

/// A root that could not be resolved. Only recoverable per-root conditions
/// (unknown slug, no compatible file) end up here; transport and auth
/// failures abort the whole batch instead.
#[derive(Debug)]
pub struct RootFailure {
    pub root: String,
    pub error: anyhow::Error,
}

/// The completed closure plus any per-root failures.
#[derive(Debug, Default)]
pub struct Resolution {
    pub mods: BTreeMap<String, ResolvedMod>,
    pub failures: Vec<RootFailure>,
}

impl Resolution {
    /// Merge the closure into an index snapshot. The user flag is
    /// upgrade-only: a mod that was already user-requested stays so even
    /// when it re-enters as a plain dependency.
    pub fn apply_to(&self, index: &mut IndexFile) {
        for (slug, resolved) in &self.mods {
            let already_user = index.get(slug).is_some_and(|r| r.user_mod);
            index.insert(
                slug.clone(),
                ModRecord {
                    user_mod: resolved.user_requested || already_user,
                    dependencies: resolved.dependencies.clone(),
                },
            );
        }
    }
}

pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
    game_version: String,
    loader: ModLoader,
    include_optional: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        game_version: impl Into<String>,
        loader: ModLoader,
        include_optional: bool,
    ) -> Self {
        Self {
            catalog,
            game_version: game_version.into(),
            loader,
            include_optional,
        }
    }

    /// Build the transitive closure of `roots`.
    ///
    /// Each root is resolved against the mods gathered so far and committed
    /// only if its whole subtree resolves; a failing root leaves no partial
    /// entries behind and does not stop the remaining roots.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, roots: &[String]) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for root in roots {
            if let Some(existing) = resolution.mods.get_mut(root) {
                // Already reached as a dependency of an earlier root (or a
                // duplicate root); just promote the flag.
                existing.user_requested = true;
                continue;
            }

            info!("Gathering {}...", root);
            match self.resolve_root(root, &resolution.mods).await {
                Ok(subtree) => {
                    for (slug, resolved) in subtree {
                        resolution.mods.insert(slug, resolved);
                    }
                }
                Err(error) => {
                    let per_root = error
                        .downcast_ref::<McpkgError>()
                        .is_some_and(McpkgError::is_per_root);
                    if !per_root {
                        return Err(error);
                    }
                    debug!("Root '{}' failed: {}", root, error);
                    resolution.failures.push(RootFailure {
                        root: root.clone(),
                        error,
                    });
                }
            }
        }

        Ok(resolution)
    }

    /// Resolve one root and everything reachable from it that `seen` does
    /// not already cover. Returns the new entries only.
    async fn resolve_root(
        &self,
        root: &str,
        seen: &BTreeMap<String, ResolvedMod>,
    ) -> Result<Vec<(String, ResolvedMod)>> {
        let mut added: Vec<(String, ResolvedMod)> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, bool)> = VecDeque::new();
        queue.push_back((root.to_string(), true));

        while let Some((slug, user_requested)) = queue.pop_front() {
            if seen.contains_key(&slug) || !visited.insert(slug.clone()) {
                continue;
            }

            let info = self.catalog.find_by_slug(&slug).await?;
            let file = self
                .catalog
                .latest_file(&info, &self.game_version, self.loader)
                .await?;
            let dependencies = self
                .catalog
                .direct_dependencies(&file, self.include_optional)
                .await?;

            debug!("Resolved '{}' with {} direct deps", slug, dependencies.len());
            for dep in &dependencies {
                queue.push_back((dep.clone(), false));
            }

            added.push((
                slug,
                ResolvedMod {
                    info,
                    file,
                    user_requested,
                    dependencies,
                },
            ));
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalog;
    use crate::test_utils::{dep, index_with, user};
    use mockall::predicate::eq;

    /// Wire a mock catalog so `slug` resolves with the given dependency
    /// slugs. Mod ids are irrelevant to the resolver; they stay zero.
    fn stub_mod(catalog: &mut MockCatalog, slug: &str, deps: &[&str], times: usize) {
        let slug_owned = slug.to_string();
        catalog
            .expect_find_by_slug()
            .withf(move |s| s == slug_owned)
            .times(times)
            .returning(move |s| {
                Ok(ModInfo {
                    slug: s.to_string(),
                    name: s.to_string(),
                    ..Default::default()
                })
            });

        let for_file = slug.to_string();
        let file_name = format!("{}.jar", slug);
        catalog
            .expect_latest_file()
            .withf(move |info, _, _| info.slug == for_file)
            .times(times)
            .returning(move |info, _, _| {
                Ok(ModFile {
                    file_name: format!("{}.jar", info.slug),
                    ..Default::default()
                })
            });

        let deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
        catalog
            .expect_direct_dependencies()
            .withf(move |file, _| file.file_name == file_name)
            .times(times)
            .returning(move |_, _| Ok(deps.clone()));
    }

    fn resolver(catalog: &MockCatalog) -> Resolver<'_> {
        Resolver::new(catalog, "1.19.2", ModLoader::Forge, false)
    }

    #[test_log::test(tokio::test)]
    async fn test_diamond_resolves_shared_dependency_once() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "a", &["b", "c"], 1);
        stub_mod(&mut catalog, "b", &["d"], 1);
        stub_mod(&mut catalog, "c", &["d"], 1);
        stub_mod(&mut catalog, "d", &[], 1); // exactly one visit

        let resolution = resolver(&catalog)
            .resolve(&["a".to_string()])
            .await
            .unwrap();

        assert_eq!(resolution.mods.len(), 4);
        assert!(resolution.failures.is_empty());
        assert!(resolution.mods["a"].user_requested);
        assert!(!resolution.mods["d"].user_requested);
        assert_eq!(resolution.mods["a"].dependencies, vec!["b", "c"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_cycle_terminates_with_each_mod_once() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "a", &["b"], 1);
        stub_mod(&mut catalog, "b", &["a"], 1);

        let resolution = resolver(&catalog)
            .resolve(&["a".to_string()])
            .await
            .unwrap();

        assert_eq!(resolution.mods.len(), 2);
        assert!(resolution.mods["a"].user_requested);
        assert!(!resolution.mods["b"].user_requested);
    }

    #[test_log::test(tokio::test)]
    async fn test_failing_root_does_not_abort_the_batch() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "good", &[], 1);
        catalog
            .expect_find_by_slug()
            .with(eq("missing"))
            .returning(|s| Err(McpkgError::ModNotFound(s.to_string()).into()));

        let resolution = resolver(&catalog)
            .resolve(&["missing".to_string(), "good".to_string()])
            .await
            .unwrap();

        assert_eq!(resolution.mods.len(), 1);
        assert!(resolution.mods.contains_key("good"));
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].root, "missing");
    }

    #[test_log::test(tokio::test)]
    async fn test_failing_dependency_discards_the_whole_root() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "a", &["gone"], 1);
        catalog
            .expect_find_by_slug()
            .with(eq("gone"))
            .returning(|s| Err(McpkgError::ModNotFound(s.to_string()).into()));

        let resolution = resolver(&catalog)
            .resolve(&["a".to_string()])
            .await
            .unwrap();

        // 'a' resolved fine but its subtree failed, so nothing is committed
        assert!(resolution.mods.is_empty());
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].root, "a");
    }

    #[test_log::test(tokio::test)]
    async fn test_transport_error_aborts_the_batch() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_find_by_slug()
            .returning(|_| Err(anyhow::anyhow!("connection reset by peer")));

        let result = resolver(&catalog)
            .resolve(&["a".to_string(), "b".to_string()])
            .await;

        assert!(result.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_root_reached_earlier_as_dependency_is_promoted() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "a", &["b"], 1);
        stub_mod(&mut catalog, "b", &[], 1); // not re-resolved as a root

        let resolution = resolver(&catalog)
            .resolve(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert!(resolution.mods["b"].user_requested);
    }

    #[test_log::test(tokio::test)]
    async fn test_apply_to_is_upgrade_only() {
        let mut catalog = MockCatalog::new();
        stub_mod(&mut catalog, "x", &["y"], 1);
        stub_mod(&mut catalog, "y", &[], 1);

        let resolution = resolver(&catalog)
            .resolve(&["x".to_string()])
            .await
            .unwrap();

        // 'y' is already a user mod in the index; re-resolving it as a
        // dependency must not downgrade it.
        let mut index = index_with(&[("y", user(&[])), ("stale", dep(&["y"]))]);
        resolution.apply_to(&mut index);

        assert!(index.get("x").unwrap().user_mod);
        assert!(index.get("y").unwrap().user_mod);
        assert_eq!(index.get("x").unwrap().dependencies, vec!["y"]);
        // Unrelated records survive the merge
        assert!(index.contains("stale"));
    }
}
