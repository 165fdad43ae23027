//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeSpotify, JAZZ_ARTIST_ID, STATIC_ACCESS_TOKEN};
//! use adaptive_equalizer::spotify::{SpotifyClient, TokenSource};
//!
//! #[tokio::test]
//! async fn test_get_artist() {
//!     let spotify = FakeSpotify::spawn().await;
//!     let config = spotify.client_config(TokenSource::Static(STATIC_ACCESS_TOKEN.into()));
//!     let client = SpotifyClient::new(&config).unwrap();
//!
//!     let artist = client.artist(JAZZ_ARTIST_ID).await.unwrap();
//!     assert_eq!(artist.genres, vec!["Jazz", "Fusion"]);
//! }
//! ```

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{playing_episode, playing_track};
pub use server::FakeSpotify;
