//! `mcpkg search` - query the catalog, most relevant first.

use anyhow::Result;

use crate::catalog::{Catalog, sort_by_relevance};

#[tracing::instrument(skip(catalog))]
pub async fn search(catalog: &dyn Catalog, query: &str) -> Result<()> {
    let mut mods = catalog.search(query).await?;
    sort_by_relevance(&mut mods, query);

    if mods.is_empty() {
        println!("No mods found for '{}'", query);
        return Ok(());
    }

    for info in &mods {
        match &info.summary {
            Some(summary) => println!("{} ({}) - {}", info.name, info.slug, summary),
            None => println!("{} ({})", info.name, info.slug),
        }
    }
    Ok(())
}
