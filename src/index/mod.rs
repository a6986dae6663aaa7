//! The local package index: which mods are installed, which were asked for
//! by the user, and what each one directly depends on.

pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ModLoader;

pub use store::IndexStore;

/// One installed mod.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModRecord {
    /// True if the user explicitly asked for this mod; false if it was
    /// pulled in only as a dependency. Upgrade-only: re-installing never
    /// downgrades it.
    pub user_mod: bool,
    /// Immediate dependencies as resolved at install time, in discovery
    /// order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// The whole index file: `{ version, modLoader, mods }`.
///
/// Unknown top-level keys round-trip untouched through read-modify-write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    pub version: String,
    pub mod_loader: ModLoader,
    #[serde(default)]
    pub mods: BTreeMap<String, ModRecord>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IndexFile {
    pub fn new(version: impl Into<String>, mod_loader: ModLoader) -> Self {
        Self {
            version: version.into(),
            mod_loader,
            mods: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&ModRecord> {
        self.mods.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.mods.contains_key(slug)
    }

    pub fn insert(&mut self, slug: impl Into<String>, record: ModRecord) {
        self.mods.insert(slug.into(), record);
    }

    pub fn remove(&mut self, slug: &str) -> Option<ModRecord> {
        self.mods.remove(slug)
    }

    /// Slugs the user installed explicitly.
    pub fn user_slugs(&self) -> Vec<String> {
        self.mods
            .iter()
            .filter(|(_, record)| record.user_mod)
            .map(|(slug, _)| slug.clone())
            .collect()
    }

    /// Number of records listing `slug` in their direct dependencies,
    /// counting every occurrence. A record listing the same slug twice
    /// contributes two, matching the symmetric decrement in the removal
    /// planner.
    pub fn referrer_count(&self, slug: &str) -> usize {
        self.mods
            .values()
            .flat_map(|record| record.dependencies.iter())
            .filter(|dep| dep.as_str() == slug)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dep, index_with, user};

    #[test]
    fn test_referrer_count_across_whole_index() {
        let index = index_with(&[
            ("x", user(&["y"])),
            ("z", user(&["y"])),
            ("y", dep(&[])),
        ]);
        assert_eq!(index.referrer_count("y"), 2);
        assert_eq!(index.referrer_count("x"), 0);
        assert_eq!(index.referrer_count("missing"), 0);
    }

    #[test]
    fn test_referrer_count_counts_duplicate_listings() {
        let index = index_with(&[("x", user(&["y", "y"])), ("y", dep(&[]))]);
        assert_eq!(index.referrer_count("y"), 2);
    }

    #[test]
    fn test_user_slugs() {
        let index = index_with(&[
            ("x", user(&["y"])),
            ("y", dep(&[])),
            ("z", user(&[])),
        ]);
        assert_eq!(index.user_slugs(), vec!["x".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_round_trip_preserves_unknown_keys() {
        let raw = r#"{
            "version": "1.19.2",
            "modLoader": "forge",
            "comment": "hand-edited",
            "mods": {
                "jei": {"userMod": true, "dependencies": []}
            }
        }"#;
        let mut index: IndexFile = serde_json::from_str(raw).unwrap();
        index.insert("sodium", dep(&[]));

        let out = serde_json::to_value(&index).unwrap();
        assert_eq!(out["comment"], "hand-edited");
        assert_eq!(out["version"], "1.19.2");
        assert_eq!(out["modLoader"], "forge");
        assert_eq!(out["mods"]["jei"]["userMod"], true);
        assert_eq!(out["mods"]["sodium"]["userMod"], false);
    }

    #[test]
    fn test_record_without_dependencies_key_parses() {
        let record: ModRecord = serde_json::from_str(r#"{"userMod": true}"#).unwrap();
        assert!(record.user_mod);
        assert!(record.dependencies.is_empty());
    }
}
