//! Response types of the Spotify Web API endpoints we use.

use serde::Deserialize;

use crate::metadata::ArtistMetadata;
use crate::player::{ArtistRef, Track};

/// `GET /artists/{id}`
#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl From<SpotifyArtist> for ArtistMetadata {
    fn from(artist: SpotifyArtist) -> Self {
        ArtistMetadata {
            id: artist.id,
            name: artist.name,
            genres: artist.genres,
        }
    }
}

/// `GET /me/player/currently-playing`
#[derive(Clone, Debug, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub currently_playing_type: Option<String>,
    #[serde(default)]
    pub item: Option<PlayingItem>,
}

/// A track or an episode. Episodes carry no artists.
#[derive(Clone, Debug, Deserialize)]
pub struct PlayingItem {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<SpotifyArtistRef>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyArtistRef {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CurrentlyPlaying {
    /// The loaded item as a [`Track`], whether playing or paused.
    pub fn into_track(self) -> Option<Track> {
        let item = self.item?;
        Some(Track {
            uri: item.uri,
            name: item.name,
            artists: item.artists.map(|artists| {
                artists
                    .into_iter()
                    .map(|a| ArtistRef {
                        uri: a.uri,
                        name: a.name,
                    })
                    .collect()
            }),
        })
    }
}
