//! Error conditions the engine distinguishes by kind.
//!
//! Everything else travels as a plain [`anyhow::Error`]; these variants
//! exist because a caller changes behavior on them.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum McpkgError {
    #[error("Mod '{0}' not found in the catalog")]
    ModNotFound(String),

    #[error("No file of '{slug}' is compatible with {game_version}-{loader}")]
    NoCompatibleFile {
        slug: String,
        game_version: String,
        loader: String,
    },

    #[error("Mod '{0}' is not declared in the index")]
    NotDeclared(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} does not exist; run init first")]
    NotInitialized(String),

    #[error("{path} is not a valid index file: {detail}")]
    MalformedIndex { path: String, detail: String },
}

impl McpkgError {
    /// True for conditions that fail a single requested mod without
    /// poisoning the rest of a batch.
    pub fn is_per_root(&self) -> bool {
        matches!(
            self,
            McpkgError::ModNotFound(_) | McpkgError::NoCompatibleFile { .. }
        )
    }
}
