//! Fake Spotify Web API and accounts service
//!
//! Each test gets its own server on a random port, seeded with the artists
//! from [`super::constants`]. Issued tokens are tracked so tests can revoke
//! them and count how often the accounts service was asked.

use super::constants::*;
use adaptive_equalizer::spotify::{SpotifyClientConfig, TokenSource};
use axum::extract::{Form, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

struct FakeState {
    artists: HashMap<String, Vec<String>>,
    now_playing: Mutex<Option<Value>>,
    valid_tokens: Mutex<HashSet<String>>,
    token_requests: Mutex<Vec<HashMap<String, String>>>,
    artist_requests: AtomicUsize,
    issued_tokens: AtomicUsize,
    token_lifetime_sec: AtomicU64,
}

impl FakeState {
    fn seeded() -> Self {
        let artists = [
            (JAZZ_ARTIST_ID, vec!["Jazz", "Fusion"]),
            (ROCK_ARTIST_ID, vec!["rock", "classic rock"]),
            (SPACED_GENRE_ARTIST_ID, vec!["hip hop"]),
            (NO_GENRES_ARTIST_ID, vec![]),
        ]
        .into_iter()
        .map(|(id, genres)| {
            (
                id.to_string(),
                genres.into_iter().map(String::from).collect(),
            )
        })
        .collect();

        Self {
            artists,
            now_playing: Mutex::new(None),
            valid_tokens: Mutex::new(HashSet::from([STATIC_ACCESS_TOKEN.to_string()])),
            token_requests: Mutex::new(Vec::new()),
            artist_requests: AtomicUsize::new(0),
            issued_tokens: AtomicUsize::new(0),
            token_lifetime_sec: AtomicU64::new(3600),
        }
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| self.valid_tokens.lock().unwrap().contains(token))
            .unwrap_or(false)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"status": 401, "message": "Invalid access token"}})),
    )
        .into_response()
}

async fn issue_token(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.lock().unwrap().push(form.clone());

    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if basic != Some(CLIENT_BASIC_AUTH) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        )
            .into_response();
    }

    let refresh_token = form.get("refresh_token").map(String::as_str);
    match form.get("grant_type").map(String::as_str) {
        Some("client_credentials") => {}
        Some("refresh_token") if refresh_token == Some(REFRESH_TOKEN) => {}
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid_grant"})),
            )
                .into_response()
        }
    }

    let n = state.issued_tokens.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("issued-token-{}", n);
    state.valid_tokens.lock().unwrap().insert(token.clone());

    Json(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": state.token_lifetime_sec.load(Ordering::SeqCst),
    }))
    .into_response()
}

async fn get_artist(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    state.artist_requests.fetch_add(1, Ordering::SeqCst);

    if id == FAILING_ARTIST_ID {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"status": 500, "message": "Server error"}})),
        )
            .into_response();
    }
    if id == RATE_LIMITED_ARTIST_ID {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            Json(json!({"error": {"status": 429, "message": "API rate limit exceeded"}})),
        )
            .into_response();
    }

    match state.artists.get(&id) {
        Some(genres) => Json(json!({
            "id": id,
            "name": format!("Artist {}", id),
            "uri": format!("spotify:artist:{}", id),
            "type": "artist",
            "genres": genres,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"status": 404, "message": "Resource not found"}})),
        )
            .into_response(),
    }
}

async fn currently_playing(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    match state.now_playing.lock().unwrap().clone() {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Fake Spotify instance
///
/// When dropped, the server shuts down.
pub struct FakeSpotify {
    /// Base URL of the server, e.g. "http://127.0.0.1:12345"
    pub base_url: String,

    state: Arc<FakeState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeSpotify {
    /// Spawns a new fake on a random port.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::seeded());

        let app = Router::new()
            .route("/api/token", post(issue_token))
            .route("/v1/artists/{id}", get(get_artist))
            .route("/v1/me/player/currently-playing", get(currently_playing))
            .with_state(state.clone());

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // The listener is already bound, so requests queue until serve starts.
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    /// Client settings pointing at this fake.
    pub fn client_config(&self, token_source: TokenSource) -> SpotifyClientConfig {
        let mut config = SpotifyClientConfig::new(token_source);
        config.api_base_url = self.api_base_url();
        config.accounts_base_url = self.base_url.clone();
        config
    }

    /// Sets the body of `currently-playing`. `None` answers 204.
    pub fn set_now_playing(&self, body: Option<Value>) {
        *self.state.now_playing.lock().unwrap() = body;
    }

    /// Lifetime, in seconds, of tokens issued from now on.
    pub fn set_token_lifetime_sec(&self, seconds: u64) {
        self.state
            .token_lifetime_sec
            .store(seconds, Ordering::SeqCst);
    }

    /// Makes the API reject `token` from now on.
    pub fn revoke_token(&self, token: &str) {
        self.state.valid_tokens.lock().unwrap().remove(token);
    }

    /// Form bodies of every request the accounts service received.
    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_requests.lock().unwrap().clone()
    }

    /// Number of authorized artist lookups served.
    pub fn artist_requests(&self) -> usize {
        self.state.artist_requests.load(Ordering::SeqCst)
    }
}
