//! Reacts to track changes by detecting the genre and applying a preset.
//!
//! Each change is handled on its own spawned task, so the dispatcher is never
//! blocked. Tasks for rapid changes overlap and may finish out of order; with
//! [`StaleResultPolicy::ApplyAll`] the last one to finish decides the preset,
//! with [`StaleResultPolicy::LatestOnly`] results from superseded changes are
//! dropped.
//!
//! [`StaleResultPolicy::ApplyAll`]: crate::equalizer::StaleResultPolicy::ApplyAll
//! [`StaleResultPolicy::LatestOnly`]: crate::equalizer::StaleResultPolicy::LatestOnly

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::equalizer::{ApplyOutcome, PresetApplier};
use crate::genre::{GenreResolution, GenreResolver};
use crate::player::{Track, TrackChange};

/// Everything that happened for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub track_uri: String,
    pub sequence: u64,
    pub resolution: GenreResolution,
    pub apply: ApplyOutcome,
}

#[derive(Clone)]
pub struct TrackChangeHandler {
    resolver: Arc<GenreResolver>,
    applier: Arc<PresetApplier>,
}

impl TrackChangeHandler {
    pub fn new(resolver: Arc<GenreResolver>, applier: Arc<PresetApplier>) -> Self {
        Self { resolver, applier }
    }

    /// Starts genre detection for the new track and returns without waiting.
    ///
    /// Returns `None`, doing nothing, when the change carries no track.
    pub fn handle(&self, change: TrackChange) -> Option<JoinHandle<DetectionOutcome>> {
        let Some(track) = change.track else {
            debug!("Track change without a track, ignoring");
            return None;
        };

        let sequence = self.applier.sequence().next();
        let handler = self.clone();
        Some(tokio::spawn(async move {
            handler.detect_and_apply(sequence, &track).await
        }))
    }

    /// Detects the genre of `track` and applies the matching preset inline.
    pub async fn detect_now(&self, track: &Track) -> DetectionOutcome {
        let sequence = self.applier.sequence().next();
        self.detect_and_apply(sequence, track).await
    }

    async fn detect_and_apply(&self, sequence: u64, track: &Track) -> DetectionOutcome {
        let resolution = self.resolver.resolve(track).await;
        let apply = self
            .applier
            .apply_for_dispatch(sequence, resolution.genre_key())
            .await;
        DetectionOutcome {
            track_uri: track.uri.clone(),
            sequence,
            resolution,
            apply,
        }
    }
}
