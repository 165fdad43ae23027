use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{PlayerHost, Track, TrackChange};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Reports what the player is currently on.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    /// `Ok(None)` when nothing is loaded.
    async fn now_playing(&self) -> Result<Option<Track>>;
}

/// A [`PlayerHost`] built on periodically asking a [`NowPlayingSource`].
///
/// Becomes ready after the first successful poll and broadcasts a
/// [`TrackChange`] whenever the track URI differs from the last one seen.
/// Changes are held back while nobody is subscribed, so the first listener
/// still hears about the track that was playing when it registered.
pub struct PollingPlayer {
    source: Arc<dyn NowPlayingSource>,
    poll_interval: Duration,
    ready: AtomicBool,
    events: broadcast::Sender<TrackChange>,
}

impl PollingPlayer {
    pub fn new(source: Arc<dyn NowPlayingSource>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            poll_interval,
            ready: AtomicBool::new(false),
            events,
        }
    }

    /// Polling loop - call from a spawned task.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            "Player poller starting (interval={}ms)",
            self.poll_interval.as_millis()
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_uri: Option<String> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.cancelled() => {
                    info!("Player poller shutting down");
                    break;
                }
            }

            let track = match self.source.now_playing().await {
                Ok(track) => track,
                Err(e) => {
                    warn!("Failed to poll the player: {:#}", e);
                    continue;
                }
            };

            if !self.ready.swap(true, Ordering::SeqCst) {
                info!("Player is ready");
            }

            let uri = track.as_ref().map(|t| t.uri.clone());
            if uri == last_uri {
                continue;
            }
            // Fails while nobody listens; the change is sent again on the next poll.
            if self.events.send(TrackChange { track }).is_ok() {
                debug!(from = ?last_uri, to = ?uri, "Track changed");
                last_uri = uri;
            }
        }

        info!("Player poller stopped");
    }
}

#[async_trait]
impl PlayerHost for PollingPlayer {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<TrackChange> {
        self.events.subscribe()
    }
}
