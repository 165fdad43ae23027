use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adaptive_equalizer::agent::EqAgent;
use adaptive_equalizer::config::{self, AppConfig, EqualizerOutput, EqualizerOutputKind};
use adaptive_equalizer::equalizer::{
    ApplyOutcome, CommandEqualizer, EqualizerControl, GenrePresetTable, LoggingEqualizer,
    PresetApplier, BAND_FREQUENCIES_HZ,
};
use adaptive_equalizer::genre::GenreResolver;
use adaptive_equalizer::handler::TrackChangeHandler;
use adaptive_equalizer::player::{ArtistRef, PollingPlayer, Track};
use adaptive_equalizer::spotify::{SpotifyClient, DEFAULT_ACCOUNTS_BASE_URL, DEFAULT_API_BASE_URL};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(version, about = "Switches equalizer presets to match the genre of the playing track")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Default log level, e.g. "debug". The LOG_LEVEL env var takes precedence.
    #[clap(long)]
    pub log_level: Option<String>,

    /// How often to check whether the player is ready, in milliseconds.
    #[clap(long, default_value_t = config::DEFAULT_READINESS_POLL_INTERVAL_MS)]
    pub readiness_poll_interval_ms: u64,

    /// Give up waiting for the player after this many seconds. Waits forever if unset or 0.
    #[clap(long)]
    pub readiness_timeout_sec: Option<u64>,

    /// How often to poll Spotify for the currently playing track, in milliseconds.
    #[clap(long, default_value_t = config::DEFAULT_PLAYER_POLL_INTERVAL_MS)]
    pub player_poll_interval_ms: u64,

    /// Timeout in seconds for Spotify requests. Set to 0 to disable.
    #[clap(long, default_value_t = 0)]
    pub request_timeout_sec: u64,

    /// Drop genre results for tracks that were already skipped.
    #[clap(long)]
    pub discard_stale_results: bool,

    /// Base URL of the Spotify Web API.
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Base URL of the Spotify accounts service.
    #[clap(long, default_value = DEFAULT_ACCOUNTS_BASE_URL)]
    pub accounts_base_url: String,

    /// Where presets are applied.
    #[clap(long, value_enum, default_value_t = EqualizerOutputKind::Log)]
    pub equalizer_output: EqualizerOutputKind,

    /// Command used by the "command" output, repeat for each argument.
    /// The ten gains are appended when it runs.
    #[clap(long = "equalizer-command", value_name = "ARG", allow_hyphen_values = true)]
    pub equalizer_command: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the player and switch presets on every track change (default).
    Run,

    /// Print the genre preset table.
    Presets,

    /// Detect the genre of one artist and apply its preset once.
    Detect { artist_uri: String },
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            log_level: args.log_level.clone(),
            readiness_poll_interval_ms: args.readiness_poll_interval_ms,
            readiness_timeout_sec: args.readiness_timeout_sec,
            player_poll_interval_ms: args.player_poll_interval_ms,
            request_timeout_sec: args.request_timeout_sec,
            discard_stale_results: args.discard_stale_results,
            api_base_url: args.api_base_url.clone(),
            accounts_base_url: args.accounts_base_url.clone(),
            equalizer_output: args.equalizer_output,
            equalizer_command: args.equalizer_command.clone(),
            client_id: env_var("SPOTIFY_CLIENT_ID"),
            client_secret: env_var("SPOTIFY_CLIENT_SECRET"),
            refresh_token: env_var("SPOTIFY_REFRESH_TOKEN"),
            access_token: env_var("SPOTIFY_ACCESS_TOKEN"),
        }
    }
}

fn init_logging(log_level: Option<&str>) {
    let default_level = log_level
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();
}

fn build_equalizer(output: &EqualizerOutput) -> Result<Arc<dyn EqualizerControl>> {
    match output {
        EqualizerOutput::Log => Ok(Arc::new(LoggingEqualizer)),
        EqualizerOutput::Command(command) => {
            let equalizer =
                CommandEqualizer::new(command).context("Equalizer command must not be empty")?;
            info!("Applying presets with {:?}", command);
            Ok(Arc::new(equalizer))
        }
    }
}

fn print_presets() {
    let table = GenrePresetTable::builtin();
    let header: Vec<String> = BAND_FREQUENCIES_HZ
        .iter()
        .map(|hz| {
            if *hz >= 1000 {
                format!("{}k", hz / 1000)
            } else {
                hz.to_string()
            }
        })
        .collect();
    println!("{:<12} [{}] Hz", "genre", header.join(", "));
    for (key, preset) in table.entries() {
        println!("{:<12} {}", key, preset);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => Some(config::FileConfig::load(path)?),
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    init_logging(app_config.log_level.as_deref());
    if let Some(path) = &cli_args.config {
        info!("Loaded configuration from {:?}", path);
    }

    match cli_args.command.unwrap_or(Command::Run) {
        Command::Presets => {
            print_presets();
            Ok(())
        }
        Command::Detect { artist_uri } => detect(&app_config, artist_uri).await,
        Command::Run => run(&app_config).await,
    }
}

async fn detect(app_config: &AppConfig, artist_uri: String) -> Result<()> {
    let client = Arc::new(SpotifyClient::new(&app_config.spotify_client_config()?)?);
    let equalizer = build_equalizer(&app_config.equalizer)?;
    let handler = TrackChangeHandler::new(
        Arc::new(GenreResolver::new(client)),
        Arc::new(PresetApplier::new(equalizer)),
    );

    let track = Track::new(format!("detect:{}", artist_uri))
        .with_artists(vec![ArtistRef::new(artist_uri)]);
    let outcome = handler.detect_now(&track).await;

    println!("genre:  {}", outcome.resolution.genre_key());
    match outcome.apply {
        ApplyOutcome::Applied {
            preset_key, preset, ..
        } => {
            println!("preset: {} {}", preset_key, preset);
            Ok(())
        }
        ApplyOutcome::Failed { error, .. } => bail!("Failed to apply the preset: {}", error),
        ApplyOutcome::Discarded { .. } => bail!("Detection result was discarded"),
    }
}

async fn run(app_config: &AppConfig) -> Result<()> {
    let client_config = app_config.spotify_client_config()?;
    if !client_config.token_source.has_user_scope() {
        bail!(
            "Following the player needs a user token: set SPOTIFY_ACCESS_TOKEN or \
             SPOTIFY_REFRESH_TOKEN"
        );
    }

    info!("Configuration loaded:");
    info!("  api_base_url: {}", app_config.api_base_url);
    info!("  player_poll_interval: {:?}", app_config.player_poll_interval);
    info!("  stale_result_policy: {:?}", app_config.stale_result_policy);
    info!("  equalizer: {:?}", app_config.equalizer);

    let client = Arc::new(SpotifyClient::new(&client_config)?);
    let equalizer = build_equalizer(&app_config.equalizer)?;
    let applier =
        PresetApplier::new(equalizer).with_stale_policy(app_config.stale_result_policy);
    let handler = TrackChangeHandler::new(
        Arc::new(GenreResolver::new(client.clone())),
        Arc::new(applier),
    );

    let player = Arc::new(PollingPlayer::new(client, app_config.player_poll_interval));
    let agent = EqAgent::new(player.clone(), handler, app_config.readiness_gate());

    let shutdown_token = CancellationToken::new();
    let poller = tokio::spawn({
        let player = player.clone();
        let shutdown = shutdown_token.child_token();
        async move { player.run(shutdown).await }
    });

    let result = tokio::select! {
        result = agent.run(shutdown_token.child_token()) => {
            if let Err(e) = &result {
                error!("Agent stopped: {}", e);
            }
            result.map_err(anyhow::Error::from)
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            Ok(())
        }
    };

    shutdown_token.cancel();
    if let Err(e) = poller.await {
        error!("Player poller task failed: {}", e);
    }
    result
}
