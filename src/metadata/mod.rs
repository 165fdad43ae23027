//! Artist metadata lookups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What we know about an artist. Fetched fresh on every track change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistMetadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Genre labels as the provider returns them, most relevant first.
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Artist not found: {0}")]
    NotFound(String),

    #[error("Metadata service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid metadata response: {0}")]
    InvalidResponse(String),
}

/// Source of artist metadata, keyed by artist id.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ArtistMetadataProvider: Send + Sync {
    async fn artist(&self, artist_id: &str) -> Result<ArtistMetadata, MetadataError>;
}
