use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub log_level: Option<String>,
    pub readiness_poll_interval_ms: Option<u64>,
    pub readiness_timeout_sec: Option<u64>,
    pub player_poll_interval_ms: Option<u64>,
    pub request_timeout_sec: Option<u64>,
    pub discard_stale_results: Option<bool>,

    // Feature configs
    pub spotify: Option<SpotifyConfig>,
    pub equalizer: Option<EqualizerConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SpotifyConfig {
    pub api_base_url: Option<String>,
    pub accounts_base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct EqualizerConfig {
    /// "log" or "command"
    pub output: Option<String>,
    /// Program and leading arguments; the ten gains are appended.
    pub command: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
