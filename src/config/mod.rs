mod file_config;

pub use file_config::{EqualizerConfig, FileConfig, SpotifyConfig};

use crate::equalizer::StaleResultPolicy;
use crate::player::ReadinessGate;
use crate::spotify::{
    SpotifyClientConfig, TokenSource, DEFAULT_ACCOUNTS_BASE_URL, DEFAULT_API_BASE_URL,
};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_READINESS_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_PLAYER_POLL_INTERVAL_MS: u64 = 1000;

/// Where presets end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EqualizerOutputKind {
    /// Only log the preset.
    #[default]
    Log,
    /// Run an external command with the gains as arguments.
    Command,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
/// Credentials also come through here, read from the environment by `main`.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: Option<String>,
    pub readiness_poll_interval_ms: u64,
    pub readiness_timeout_sec: Option<u64>,
    pub player_poll_interval_ms: u64,
    pub request_timeout_sec: u64,
    pub discard_stale_results: bool,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub equalizer_output: EqualizerOutputKind,
    pub equalizer_command: Vec<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            readiness_poll_interval_ms: DEFAULT_READINESS_POLL_INTERVAL_MS,
            readiness_timeout_sec: None,
            player_poll_interval_ms: DEFAULT_PLAYER_POLL_INTERVAL_MS,
            request_timeout_sec: 0,
            discard_stale_results: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            equalizer_output: EqualizerOutputKind::Log,
            equalizer_command: Vec::new(),
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EqualizerOutput {
    Log,
    /// Program followed by its leading arguments. Never empty.
    Command(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub readiness_poll_interval: Duration,
    pub readiness_timeout: Option<Duration>,
    pub player_poll_interval: Duration,
    /// `None` means requests may take as long as they take.
    pub request_timeout: Option<Duration>,
    pub stale_result_policy: StaleResultPolicy,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub credentials: Option<TokenSource>,
    pub equalizer: EqualizerOutput,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let log_level = file.log_level.or_else(|| cli.log_level.clone());

        let readiness_poll_interval_ms = file
            .readiness_poll_interval_ms
            .unwrap_or(cli.readiness_poll_interval_ms);
        if readiness_poll_interval_ms == 0 {
            bail!("readiness_poll_interval_ms must be greater than 0");
        }
        let player_poll_interval_ms = file
            .player_poll_interval_ms
            .unwrap_or(cli.player_poll_interval_ms);
        if player_poll_interval_ms == 0 {
            bail!("player_poll_interval_ms must be greater than 0");
        }

        let readiness_timeout = file
            .readiness_timeout_sec
            .or(cli.readiness_timeout_sec)
            .filter(|sec| *sec > 0)
            .map(Duration::from_secs);
        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        let request_timeout =
            (request_timeout_sec > 0).then(|| Duration::from_secs(request_timeout_sec));

        let stale_result_policy = if file
            .discard_stale_results
            .unwrap_or(cli.discard_stale_results)
        {
            StaleResultPolicy::LatestOnly
        } else {
            StaleResultPolicy::ApplyAll
        };

        let spotify_file = file.spotify.unwrap_or_default();
        let api_base_url = spotify_file
            .api_base_url
            .clone()
            .unwrap_or_else(|| cli.api_base_url.clone());
        let accounts_base_url = spotify_file
            .accounts_base_url
            .clone()
            .unwrap_or_else(|| cli.accounts_base_url.clone());
        let credentials = resolve_credentials(cli, &spotify_file)?;

        let equalizer = resolve_equalizer(cli, file.equalizer.unwrap_or_default())?;

        Ok(Self {
            log_level,
            readiness_poll_interval: Duration::from_millis(readiness_poll_interval_ms),
            readiness_timeout,
            player_poll_interval: Duration::from_millis(player_poll_interval_ms),
            request_timeout,
            stale_result_policy,
            api_base_url,
            accounts_base_url,
            credentials,
            equalizer,
        })
    }

    /// Settings for the Spotify client. Fails when no credentials are configured.
    pub fn spotify_client_config(&self) -> Result<SpotifyClientConfig> {
        let Some(token_source) = self.credentials.clone() else {
            bail!(
                "Spotify credentials are required: set SPOTIFY_ACCESS_TOKEN, or \
                 SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET (plus SPOTIFY_REFRESH_TOKEN \
                 to follow the player), or the [spotify] section of the config file"
            );
        };
        Ok(SpotifyClientConfig {
            api_base_url: self.api_base_url.clone(),
            accounts_base_url: self.accounts_base_url.clone(),
            request_timeout: self.request_timeout,
            token_source,
        })
    }

    pub fn readiness_gate(&self) -> ReadinessGate {
        ReadinessGate::new(self.readiness_poll_interval).with_timeout(self.readiness_timeout)
    }
}

/// Picks a token source. A static access token wins; otherwise client id and
/// secret are used, with the refresh-token grant when a refresh token is set.
fn resolve_credentials(cli: &CliConfig, file: &SpotifyConfig) -> Result<Option<TokenSource>> {
    let access_token = file.access_token.clone().or_else(|| cli.access_token.clone());
    let client_id = file.client_id.clone().or_else(|| cli.client_id.clone());
    let client_secret = file
        .client_secret
        .clone()
        .or_else(|| cli.client_secret.clone());
    let refresh_token = file
        .refresh_token
        .clone()
        .or_else(|| cli.refresh_token.clone());

    if let Some(token) = access_token {
        return Ok(Some(TokenSource::Static(token)));
    }

    match (client_id, client_secret, refresh_token) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => {
            Ok(Some(TokenSource::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            }))
        }
        (Some(client_id), Some(client_secret), None) => Ok(Some(TokenSource::ClientCredentials {
            client_id,
            client_secret,
        })),
        (None, None, None) => Ok(None),
        (None, None, Some(_)) => {
            bail!("A refresh token needs both a client id and a client secret")
        }
        _ => bail!("Both a Spotify client id and client secret must be provided together"),
    }
}

fn resolve_equalizer(cli: &CliConfig, file: EqualizerConfig) -> Result<EqualizerOutput> {
    let kind = match file.output {
        Some(s) => match parse_equalizer_output(&s) {
            Some(kind) => kind,
            None => bail!("Unknown equalizer output {:?}, expected \"log\" or \"command\"", s),
        },
        None => cli.equalizer_output,
    };

    match kind {
        EqualizerOutputKind::Log => Ok(EqualizerOutput::Log),
        EqualizerOutputKind::Command => {
            let command = file
                .command
                .unwrap_or_else(|| cli.equalizer_command.clone());
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                bail!("The command equalizer output needs a command to run");
            }
            Ok(EqualizerOutput::Command(command))
        }
    }
}

/// Parses an equalizer output name. Uses clap's ValueEnum trait for parsing.
fn parse_equalizer_output(s: &str) -> Option<EqualizerOutputKind> {
    EqualizerOutputKind::from_str(s, true).ok()
}
