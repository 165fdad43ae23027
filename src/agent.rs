//! The long-running agent: wait for the player, then react to every track
//! change until shutdown.

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::handler::TrackChangeHandler;
use crate::player::{PlayerHost, ReadinessError, ReadinessGate};

pub struct EqAgent {
    player: Arc<dyn PlayerHost>,
    handler: TrackChangeHandler,
    readiness: ReadinessGate,
}

impl EqAgent {
    pub fn new(
        player: Arc<dyn PlayerHost>,
        handler: TrackChangeHandler,
        readiness: ReadinessGate,
    ) -> Self {
        Self {
            player,
            handler,
            readiness,
        }
    }

    /// Main loop - returns when the player's event stream ends or `shutdown`
    /// is cancelled. Fails only if a readiness timeout is configured and hit.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ReadinessError> {
        let player = &self.player;
        tokio::select! {
            result = self.readiness.wait(move || player.is_ready()) => {
                let waited = result?;
                info!("Player ready after {:?}", waited);
            }
            _ = shutdown.cancelled() => {
                info!("Shutdown requested before the player became ready");
                return Ok(());
            }
        }

        let mut events = self.player.subscribe();
        info!("Listening for track changes");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(change) => {
                        self.handler.handle(change);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} track changes, continuing with the latest", skipped);
                    }
                    Err(RecvError::Closed) => {
                        info!("Player event stream closed");
                        break;
                    }
                },
                _ = shutdown.cancelled() => {
                    info!("Agent shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
