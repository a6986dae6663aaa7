//! CurseForge REST v1 catalog implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{
    Catalog, ModFile, ModInfo, ModLoader, RELATION_OPTIONAL, RELATION_REQUIRED,
};
use crate::error::McpkgError;
use crate::http::{HttpClient, NonRetryableError};

const DEFAULT_API_URL: &str = "https://api.curseforge.com";

/// CurseForge game id for Minecraft.
const GAME_ID_MINECRAFT: u64 = 432;

/// CurseForge class id for the "Mods" category.
const CLASS_ID_MODS: u64 = 6;

/// Every CurseForge response wraps its payload in a `data` envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct CurseForge {
    http: HttpClient,
    api_url: String,
}

impl CurseForge {
    /// Build a reqwest client carrying the API key on every request.
    pub fn client(api_key: &str) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).context("Invalid CURSEFORGE_KEY value")?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("mcpkg/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }

    pub fn new(http: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { http, api_url }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let envelope: Envelope<T> = self.http.get_json(&url, query).await?;
        Ok(envelope.data)
    }

    async fn mod_by_id(&self, id: u64) -> Result<ModInfo> {
        self.get(&format!("/v1/mods/{}", id), &[])
            .await
            .with_context(|| format!("Failed to fetch mod {}", id))
    }
}

#[async_trait]
impl Catalog for CurseForge {
    #[tracing::instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> Result<ModInfo> {
        debug!("Looking up slug '{}'...", slug);

        let game_id = GAME_ID_MINECRAFT.to_string();
        let class_id = CLASS_ID_MODS.to_string();
        let result: Result<Vec<ModInfo>> = self
            .get(
                "/v1/mods/search",
                &[
                    ("gameId", game_id.as_str()),
                    ("classId", class_id.as_str()),
                    ("slug", slug),
                ],
            )
            .await;

        // A 404 on the search endpoint means the same thing as an empty page.
        let mods = match result {
            Ok(mods) => mods,
            Err(e) if matches!(e.downcast_ref(), Some(NonRetryableError::NotFound(_))) => vec![],
            Err(e) => return Err(e),
        };

        mods.into_iter()
            .next()
            .ok_or_else(|| McpkgError::ModNotFound(slug.to_string()).into())
    }

    #[tracing::instrument(skip(self, info))]
    async fn latest_file(
        &self,
        info: &ModInfo,
        game_version: &str,
        loader: ModLoader,
    ) -> Result<ModFile> {
        debug!(
            "Fetching latest file for '{}' on {}-{}...",
            info.slug, game_version, loader
        );

        let loader_id = loader.registry_id().to_string();
        let files: Vec<ModFile> = self
            .get(
                &format!("/v1/mods/{}/files", info.id),
                &[
                    ("gameVersion", game_version),
                    ("modLoaderType", loader_id.as_str()),
                    ("pageSize", "1"),
                ],
            )
            .await
            .with_context(|| format!("Failed to fetch files for '{}'", info.slug))?;

        files.into_iter().next().ok_or_else(|| {
            McpkgError::NoCompatibleFile {
                slug: info.slug.clone(),
                game_version: game_version.to_string(),
                loader: loader.to_string(),
            }
            .into()
        })
    }

    #[tracing::instrument(skip(self, file))]
    async fn direct_dependencies(
        &self,
        file: &ModFile,
        include_optional: bool,
    ) -> Result<Vec<String>> {
        let wanted: Vec<u64> = file
            .dependencies
            .iter()
            .filter(|dep| {
                dep.relation_type == RELATION_REQUIRED
                    || (include_optional && dep.relation_type == RELATION_OPTIONAL)
            })
            .map(|dep| dep.mod_id)
            .collect();

        // The file declares dependencies by numeric id; the index speaks
        // slugs, so each id is resolved through the catalog.
        let mut slugs = Vec::with_capacity(wanted.len());
        for id in wanted {
            slugs.push(self.mod_by_id(id).await?.slug);
        }
        Ok(slugs)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<ModInfo>> {
        let game_id = GAME_ID_MINECRAFT.to_string();
        let class_id = CLASS_ID_MODS.to_string();
        self.get(
            "/v1/mods/search",
            &[
                ("gameId", game_id.as_str()),
                ("classId", class_id.as_str()),
                ("searchFilter", query),
                ("pageSize", "25"),
            ],
        )
        .await
        .context("Search request failed")
    }
}
