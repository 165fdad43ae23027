//! Access tokens for the Web API.
//!
//! Tokens obtained from the accounts service are cached until shortly before
//! they expire.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::SpotifyError;

/// Tokens are renewed this long before Spotify would reject them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Longest lifetime trusted from the accounts service.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Where access tokens come from.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A ready-made user access token. Never refreshed.
    Static(String),
    /// App-only token. Enough for artist lookups, not for the player.
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// User token renewed from a refresh token.
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl TokenSource {
    /// Whether tokens from this source can read the user's playback state.
    pub fn has_user_scope(&self) -> bool {
        !matches!(self, TokenSource::ClientCredentials { .. })
    }

    fn kind(&self) -> &'static str {
        match self {
            TokenSource::Static(_) => "static",
            TokenSource::ClientCredentials { .. } => "client_credentials",
            TokenSource::RefreshToken { .. } => "refresh_token",
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => write!(f, "Static(<redacted>)"),
            TokenSource::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            TokenSource::RefreshToken { client_id, .. } => f
                .debug_struct("RefreshToken")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Default)]
struct TokenState {
    token: Option<CachedToken>,
    /// Spotify may hand out a new refresh token with each refresh.
    rotated_refresh_token: Option<String>,
}

pub struct TokenProvider {
    http: Client,
    token_url: String,
    source: TokenSource,
    state: Mutex<TokenState>,
}

impl TokenProvider {
    pub fn new(http: Client, accounts_base_url: &str, source: TokenSource) -> Self {
        let token_url = format!("{}/api/token", accounts_base_url.trim_end_matches('/'));
        Self {
            http,
            token_url,
            source,
            state: Mutex::new(TokenState::default()),
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    /// Returns a valid access token, fetching a new one if needed.
    pub async fn access_token(&self) -> Result<String, SpotifyError> {
        if let TokenSource::Static(token) = &self.source {
            return Ok(token.clone());
        }

        let mut state = self.state.lock().await;
        if let Some(cached) = &state.token {
            if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self.request_token(&state).await?;
        info!(
            source = self.source.kind(),
            "Obtained Spotify access token (expires in {}s)", response.expires_in
        );
        if response.refresh_token.is_some() {
            state.rotated_refresh_token = response.refresh_token;
        }
        state.token = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: expiry_from_now(response.expires_in),
        });
        Ok(response.access_token)
    }

    /// Forgets the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.token.take().is_some() {
            debug!("Dropped cached Spotify access token");
        }
    }

    async fn request_token(&self, state: &TokenState) -> Result<TokenResponse, SpotifyError> {
        let (client_id, client_secret, form) = match &self.source {
            TokenSource::Static(_) => unreachable!("static tokens are never requested"),
            TokenSource::ClientCredentials {
                client_id,
                client_secret,
            } => (
                client_id,
                client_secret,
                vec![("grant_type", "client_credentials".to_string())],
            ),
            TokenSource::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => {
                let refresh_token = state
                    .rotated_refresh_token
                    .clone()
                    .unwrap_or_else(|| refresh_token.clone());
                (
                    client_id,
                    client_secret,
                    vec![
                        ("grant_type", "refresh_token".to_string()),
                        ("refresh_token", refresh_token),
                    ],
                )
            }
        };

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("status {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SpotifyError::InvalidResponse(format!("Failed to parse token: {}", e)))
    }
}

/// When a token issued now with a lifetime of `expires_in` seconds expires.
fn expiry_from_now(expires_in: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in).min(MAX_TOKEN_LIFETIME);
    let now = Instant::now();
    now.checked_add(lifetime).unwrap_or(now)
}
