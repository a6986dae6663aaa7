//! `mcpkg autoremove` - sweep orphaned dependency-only mods.

use anyhow::Result;
use std::path::Path;

use super::join_slugs;
use crate::download;
use crate::index::IndexStore;
use crate::removal::orphan;
use crate::runtime::Runtime;

#[tracing::instrument(skip(runtime))]
pub fn autoremove<R: Runtime>(runtime: &R, project_dir: &Path) -> Result<()> {
    let store = IndexStore::new(runtime, project_dir);
    let mut index = store.load()?;

    let removed = orphan::sweep(&mut index);
    store.save(&index)?;

    let mods_dir = download::mods_dir(project_dir);
    for slug in &removed {
        download::remove_jars(runtime, &mods_dir, slug)?;
    }

    println!("Removed {}", join_slugs(&removed));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModLoader;
    use crate::runtime::RealRuntime;
    use crate::test_utils::{dep, user};
    use tempfile::tempdir;

    #[test]
    fn test_autoremove_sweeps_chain_and_jars() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let store = IndexStore::new(&runtime, dir.path());
        store.initialize("1.19.2", ModLoader::Forge).unwrap();
        store.put("keeper", user(&[])).unwrap();
        store.put("a", dep(&["b"])).unwrap();
        store.put("b", dep(&[])).unwrap();

        let mods = dir.path().join("mods");
        std::fs::create_dir_all(&mods).unwrap();
        std::fs::write(mods.join("a~1.jar"), b"").unwrap();
        std::fs::write(mods.join("b~2.jar"), b"").unwrap();

        autoremove(&runtime, dir.path()).unwrap();

        let index = store.load().unwrap();
        assert_eq!(index.mods.len(), 1);
        assert!(index.contains("keeper"));
        assert!(!mods.join("a~1.jar").exists());
        assert!(!mods.join("b~2.jar").exists());
    }
}
