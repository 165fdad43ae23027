use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{EqualizerControl, GenrePresetTable, Preset};

/// What to do with a detection result that finishes after a newer one was
/// dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResultPolicy {
    /// Apply every result as it completes; the last one to finish wins.
    #[default]
    ApplyAll,
    /// Drop results whose dispatch sequence is older than the newest dispatch.
    LatestOnly,
}

/// Monotonic counter handed out to every dispatched detection.
#[derive(Debug, Clone, Default)]
pub struct DispatchSequence(Arc<AtomicU64>);

impl DispatchSequence {
    /// Reserves the next sequence number, starting at 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a single apply attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied {
        requested: String,
        preset_key: &'static str,
        preset: Preset,
    },
    /// The equalizer control rejected the preset. Nothing else is done about it.
    Failed {
        requested: String,
        preset_key: &'static str,
        preset: Preset,
        error: String,
    },
    /// A newer dispatch exists and the policy is [`StaleResultPolicy::LatestOnly`].
    Discarded { sequence: u64, latest: u64 },
}

impl ApplyOutcome {
    /// The preset that was handed to the equalizer, if any.
    pub fn preset(&self) -> Option<Preset> {
        match self {
            ApplyOutcome::Applied { preset, .. } | ApplyOutcome::Failed { preset, .. } => {
                Some(*preset)
            }
            ApplyOutcome::Discarded { .. } => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Maps genre keys to presets and pushes them to an equalizer control.
pub struct PresetApplier {
    table: &'static GenrePresetTable,
    control: Arc<dyn EqualizerControl>,
    policy: StaleResultPolicy,
    sequence: DispatchSequence,
}

impl PresetApplier {
    pub fn new(control: Arc<dyn EqualizerControl>) -> Self {
        Self {
            table: GenrePresetTable::builtin(),
            control,
            policy: StaleResultPolicy::default(),
            sequence: DispatchSequence::default(),
        }
    }

    pub fn with_stale_policy(mut self, policy: StaleResultPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> StaleResultPolicy {
        self.policy
    }

    pub fn sequence(&self) -> &DispatchSequence {
        &self.sequence
    }

    /// Applies the preset for `genre_key`, or the default preset when the key
    /// is not in the table. Equalizer errors are logged and reported in the
    /// outcome, never returned.
    pub async fn apply(&self, genre_key: &str) -> ApplyOutcome {
        let resolved = self.table.resolve(genre_key);
        debug!(
            genre = genre_key,
            preset = resolved.key,
            "Resolved equalizer preset"
        );

        match self.control.apply(&resolved.preset).await {
            Ok(()) => {
                info!(
                    genre = genre_key,
                    preset = resolved.key,
                    "Applied equalizer preset {}",
                    resolved.preset
                );
                ApplyOutcome::Applied {
                    requested: genre_key.to_string(),
                    preset_key: resolved.key,
                    preset: resolved.preset,
                }
            }
            Err(e) => {
                error!("Error setting equalizer: {}", e);
                ApplyOutcome::Failed {
                    requested: genre_key.to_string(),
                    preset_key: resolved.key,
                    preset: resolved.preset,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Like [`apply`](Self::apply) but honours the stale-result policy for a
    /// result tagged with its dispatch `sequence`.
    pub async fn apply_for_dispatch(&self, sequence: u64, genre_key: &str) -> ApplyOutcome {
        if self.policy == StaleResultPolicy::LatestOnly {
            let latest = self.sequence.latest();
            if sequence < latest {
                debug!(
                    sequence,
                    latest, "Discarding stale genre result for {}", genre_key
                );
                return ApplyOutcome::Discarded { sequence, latest };
            }
        }
        self.apply(genre_key).await
    }
}
