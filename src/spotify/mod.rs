//! Spotify Web API client.
//!
//! Provides artist lookups (used for genres) and the currently playing item
//! (used to drive the player poller).

mod auth;
mod client;
mod models;

pub use auth::{TokenProvider, TokenSource};
pub use client::SpotifyClient;
pub use models::{CurrentlyPlaying, PlayingItem, SpotifyArtist, SpotifyArtistRef};

use crate::metadata::MetadataError;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Settings needed to build a [`SpotifyClient`].
#[derive(Debug, Clone)]
pub struct SpotifyClientConfig {
    pub api_base_url: String,
    pub accounts_base_url: String,
    /// `None` leaves requests without a timeout.
    pub request_timeout: Option<Duration>,
    pub token_source: TokenSource,
}

impl SpotifyClientConfig {
    pub fn new(token_source: TokenSource) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            request_timeout: None,
            token_source,
        }
    }
}

/// Errors that can occur when talking to Spotify.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpotifyError::Timeout
        } else if e.is_decode() {
            SpotifyError::InvalidResponse(e.to_string())
        } else {
            SpotifyError::Connection(e.to_string())
        }
    }
}

impl From<SpotifyError> for MetadataError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::Api {
                status: 404,
                message,
            } => MetadataError::NotFound(message),
            SpotifyError::InvalidResponse(message) => MetadataError::InvalidResponse(message),
            other => MetadataError::Unavailable(other.to_string()),
        }
    }
}
