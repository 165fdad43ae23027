//! Picks a genre key for a track from its primary artist's metadata.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::equalizer::DEFAULT_GENRE;
use crate::metadata::ArtistMetadataProvider;
use crate::player::Track;

/// How a genre key was arrived at. Every variant yields exactly one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreResolution {
    /// First genre of the primary artist, lowercased.
    Genre(String),
    /// The track has no artists, or the first one has an empty URI.
    NoArtist,
    /// The provider answered but listed no genres.
    NoGenres { artist_id: String },
    /// The metadata lookup failed.
    FetchFailed { artist_id: String, error: String },
}

impl GenreResolution {
    pub fn genre_key(&self) -> &str {
        match self {
            GenreResolution::Genre(key) => key,
            _ => DEFAULT_GENRE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, GenreResolution::Genre(_))
    }
}

/// Lowercases a provider genre label into a table key.
pub fn normalize_genre(label: &str) -> String {
    label.to_lowercase()
}

pub struct GenreResolver {
    metadata: Arc<dyn ArtistMetadataProvider>,
}

impl GenreResolver {
    pub fn new(metadata: Arc<dyn ArtistMetadataProvider>) -> Self {
        Self { metadata }
    }

    pub async fn resolve(&self, track: &Track) -> GenreResolution {
        let artist_id = match track.primary_artist().map(|a| a.id()) {
            Some(id) if !id.is_empty() => id,
            _ => {
                debug!(track = %track.uri, "Track has no artist, using default genre");
                return GenreResolution::NoArtist;
            }
        };

        let metadata = match self.metadata.artist(artist_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(track = %track.uri, artist = artist_id, "Error detecting genre: {}", e);
                return GenreResolution::FetchFailed {
                    artist_id: artist_id.to_string(),
                    error: e.to_string(),
                };
            }
        };

        debug!(artist = artist_id, genres = ?metadata.genres, "Fetched artist genres");
        match metadata.genres.first() {
            Some(genre) => GenreResolution::Genre(normalize_genre(genre)),
            None => GenreResolution::NoGenres {
                artist_id: artist_id.to_string(),
            },
        }
    }
}
