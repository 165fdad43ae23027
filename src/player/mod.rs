//! The playback side: what is playing and when it changes.
//!
//! A [`PlayerHost`] exposes a readiness flag that is polled (see
//! [`ReadinessGate`]) and a broadcast of [`TrackChange`] notifications.

mod polling;
mod readiness;

pub use polling::{NowPlayingSource, PollingPlayer};
pub use readiness::{ReadinessError, ReadinessGate};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An artist credited on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ArtistRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
        }
    }

    /// The id part of the URI: the last `:`-separated segment.
    ///
    /// `spotify:artist:0OdUWJ0sBjDrqHygGUXeCF` gives `0OdUWJ0sBjDrqHygGUXeCF`.
    pub fn id(&self) -> &str {
        self.uri.rsplit(':').next().unwrap_or_default()
    }
}

/// The item the player is currently on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<ArtistRef>>,
}

impl Track {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
            artists: None,
        }
    }

    pub fn with_artists(mut self, artists: Vec<ArtistRef>) -> Self {
        self.artists = Some(artists);
        self
    }

    /// First credited artist, if the track has any.
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.as_ref().and_then(|a| a.first())
    }
}

/// Sent whenever the current track changes. `track` is `None` when the
/// player has nothing loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChange {
    pub track: Option<Track>,
}

impl TrackChange {
    pub fn to(track: Track) -> Self {
        Self { track: Some(track) }
    }

    pub fn cleared() -> Self {
        Self { track: None }
    }
}

/// The music player we react to.
#[async_trait]
pub trait PlayerHost: Send + Sync {
    /// Whether the player can be listened to yet.
    async fn is_ready(&self) -> bool;

    /// Registers a listener for track changes.
    fn subscribe(&self) -> broadcast::Receiver<TrackChange>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_id_from_uri() {
        assert_eq!(
            ArtistRef::new("spotify:artist:0OdUWJ0sBjDrqHygGUXeCF").id(),
            "0OdUWJ0sBjDrqHygGUXeCF"
        );
        assert_eq!(ArtistRef::new("artist:123").id(), "123");
        assert_eq!(ArtistRef::new("plain-id").id(), "plain-id");
        assert_eq!(ArtistRef::new("").id(), "");
    }

    #[test]
    fn test_primary_artist() {
        let track = Track::new("spotify:track:1").with_artists(vec![
            ArtistRef::new("artist:1"),
            ArtistRef::new("artist:2"),
        ]);
        assert_eq!(track.primary_artist().unwrap().uri, "artist:1");

        assert!(Track::new("spotify:track:2").primary_artist().is_none());
        assert!(Track::new("spotify:track:3")
            .with_artists(vec![])
            .primary_artist()
            .is_none());
    }

    #[test]
    fn test_track_deserializes_without_artists() {
        let track: Track = serde_json::from_str(r#"{"uri": "spotify:episode:9"}"#).unwrap();
        assert!(track.artists.is_none());
        assert!(track.name.is_none());
    }
}
