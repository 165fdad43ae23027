//! HTTP client for the Spotify Web API.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use super::auth::TokenProvider;
use super::models::{CurrentlyPlaying, SpotifyArtist};
use super::{SpotifyClientConfig, SpotifyError};
use crate::metadata::{ArtistMetadata, ArtistMetadataProvider, MetadataError};
use crate::player::{NowPlayingSource, Track};

pub struct SpotifyClient {
    http: Client,
    api_base_url: String,
    tokens: TokenProvider,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyClientConfig) -> Result<Self, SpotifyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SpotifyError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let tokens = TokenProvider::new(
            http.clone(),
            &config.accounts_base_url,
            config.token_source.clone(),
        );

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Get an artist, including its genres.
    pub async fn artist(&self, id: &str) -> Result<SpotifyArtist, SpotifyError> {
        let path = format!("/artists/{}", urlencoding::encode(id));
        let response = self.get(&path).await?;
        response.json().await.map_err(|e| {
            SpotifyError::InvalidResponse(format!("Failed to parse artist {}: {}", id, e))
        })
    }

    /// Get what the user's player is on. `None` when nothing is loaded.
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>, SpotifyError> {
        let response = self.get("/me/player/currently-playing").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let playing = response.json().await.map_err(|e| {
            SpotifyError::InvalidResponse(format!("Failed to parse currently playing: {}", e))
        })?;
        Ok(Some(playing))
    }

    /// Authenticated GET. Retries once with a fresh token on 401.
    async fn get(&self, path: &str) -> Result<Response, SpotifyError> {
        let url = format!("{}{}", self.api_base_url, path);

        let mut retried = false;
        loop {
            let token = self.tokens.access_token().await?;
            debug!("GET {}", url);
            let response = self.http.get(&url).bearer_auth(&token).send().await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!("Spotify rejected the access token, refreshing");
                self.tokens.invalidate().await;
                retried = true;
                continue;
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(SpotifyError::RateLimited);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
    }
}

#[async_trait]
impl ArtistMetadataProvider for SpotifyClient {
    async fn artist(&self, artist_id: &str) -> Result<ArtistMetadata, MetadataError> {
        let artist = SpotifyClient::artist(self, artist_id).await?;
        Ok(artist.into())
    }
}

#[async_trait]
impl NowPlayingSource for SpotifyClient {
    async fn now_playing(&self) -> Result<Option<Track>> {
        let playing = self.currently_playing().await?;
        Ok(playing.and_then(|p| p.into_track()))
    }
}
