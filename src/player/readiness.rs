use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("Player was not ready after {0:?}")]
    TimedOut(Duration),
}

/// Waits for something to report ready by polling it at a fixed interval.
///
/// Without a timeout the wait never gives up.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(DEFAULT_READINESS_POLL_INTERVAL)
    }
}

impl ReadinessGate {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Polls `probe` until it returns true. Returns how long the wait took.
    pub async fn wait<F, Fut>(&self, mut probe: F) -> Result<Duration, ReadinessError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let started = Instant::now();
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            if probe().await {
                let waited = started.elapsed();
                debug!(attempts, "Ready after {:?}", waited);
                return Ok(waited);
            }
            if attempts == 1 {
                info!(
                    "Waiting for the player to become ready (polling every {:?})",
                    self.poll_interval
                );
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    return Err(ReadinessError::TimedOut(timeout));
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
