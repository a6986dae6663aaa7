//! Reference-counted removal planning.
//!
//! Given a set of slugs the user wants gone, computes exactly which records
//! can be deleted without breaking anything that stays installed. Works
//! entirely over the stored index snapshot, never live catalog data.

pub mod orphan;

use anyhow::Result;
use log::warn;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::McpkgError;
use crate::index::IndexFile;

/// Compute the set of slugs deletable when removing `targets`.
///
/// Fails with [`McpkgError::NotDeclared`] before any other work if a target
/// has no record. Targets are always part of the returned set; a shared
/// dependency survives while any record outside the set still lists it, and
/// a dependency that is separately user-requested is never swept away.
pub fn plan_removal(index: &IndexFile, targets: &[String]) -> Result<BTreeSet<String>> {
    for target in targets {
        if !index.contains(target) {
            return Err(McpkgError::NotDeclared(target.clone()).into());
        }
    }

    // The user is explicitly removing these, so their protection flag is
    // off for the rest of the computation.
    let mut working = index.clone();
    for target in targets {
        if let Some(record) = working.mods.get_mut(target) {
            record.user_mod = false;
        }
    }

    // chain = targets plus their full transitive dependency closure,
    // visited-set traversal so cycles terminate.
    let mut chain: Vec<String> = Vec::new();
    let mut chain_set: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = targets.to_vec();
    while let Some(slug) = stack.pop() {
        if !chain_set.insert(slug.clone()) {
            continue;
        }
        match working.get(&slug) {
            Some(record) => stack.extend(record.dependencies.iter().cloned()),
            None => {
                // Listed as a dependency but never recorded: nothing to
                // traverse and nothing to count.
                warn!("'{}' has no index record; skipping", slug);
                continue;
            }
        }
        chain.push(slug);
    }

    // A chain member that is still user-requested is a separate install the
    // user did not name; it stays, and so does everything it holds onto.
    chain.retain(|slug| working.get(slug).is_some_and(|r| !r.user_mod));

    // Referrers across the entire index, counting occurrences...
    let mut counts: HashMap<&str, isize> = chain
        .iter()
        .map(|slug| (slug.as_str(), working.referrer_count(slug) as isize))
        .collect();

    // ...minus the edges that leave with the chain itself.
    for slug in &chain {
        if let Some(record) = working.get(slug) {
            for dep in &record.dependencies {
                if let Some(count) = counts.get_mut(dep.as_str()) {
                    *count -= 1;
                }
            }
        }
    }

    let mut deletable: BTreeSet<String> = chain
        .iter()
        .filter(|slug| counts.get(slug.as_str()) == Some(&0))
        .cloned()
        .collect();

    // An explicit removal always takes effect, even if a surviving record
    // still carries a stale edge to the target.
    deletable.extend(targets.iter().cloned());

    Ok(deletable)
}

/// Plan and apply: delete every deletable record from the snapshot and
/// return the deleted set.
pub fn execute_removal(index: &mut IndexFile, targets: &[String]) -> Result<BTreeSet<String>> {
    let deleted = plan_removal(index, targets)?;
    for slug in &deleted {
        index.remove(slug);
    }
    Ok(deleted)
}
