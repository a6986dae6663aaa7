//! Orphan sweeping: dependency-only records with no remaining referrers.
//!
//! Installing a new version of a mod can shrink its dependency list, which
//! strands previously shared dependencies. The sweep runs to a fixed point
//! because deleting one orphan can expose the next one down a chain.

use log::debug;
use std::collections::BTreeSet;

use crate::index::IndexFile;

/// Remove every orphan from the snapshot and return the removed slugs.
pub fn sweep(index: &mut IndexFile) -> BTreeSet<String> {
    let mut removed = BTreeSet::new();

    loop {
        let orphans: Vec<String> = index
            .mods
            .iter()
            .filter(|(slug, record)| !record.user_mod && index.referrer_count(slug) == 0)
            .map(|(slug, _)| slug.clone())
            .collect();

        if orphans.is_empty() {
            return removed;
        }

        for slug in orphans {
            debug!("Sweeping orphan '{}'", slug);
            index.remove(&slug);
            removed.insert(slug);
        }
    }
}
