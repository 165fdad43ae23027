//! Adaptive Equalizer Library
//!
//! Waits for the player, watches track changes, looks up the genre of each
//! track's first artist and applies the matching equalizer preset.

pub mod agent;
pub mod config;
pub mod equalizer;
pub mod genre;
pub mod handler;
pub mod metadata;
pub mod player;
pub mod spotify;

// Re-export commonly used types for convenience
pub use agent::EqAgent;
pub use equalizer::{
    EqualizerControl, EqualizerError, GenrePresetTable, Preset, PresetApplier, StaleResultPolicy,
};
pub use genre::{GenreResolution, GenreResolver};
pub use handler::{DetectionOutcome, TrackChangeHandler};
pub use metadata::{ArtistMetadata, ArtistMetadataProvider, MetadataError};
pub use player::{ArtistRef, PlayerHost, ReadinessGate, Track, TrackChange};
pub use spotify::{SpotifyClient, SpotifyClientConfig, SpotifyError, TokenSource};
