//! Equalizer presets and the controls that apply them.
//!
//! A preset is a fixed set of ten band gains in dB. Presets are picked from a
//! static genre table ([`GenrePresetTable`]) and pushed to an
//! [`EqualizerControl`] by the [`PresetApplier`].

mod applier;
pub mod outputs;
mod presets;

pub use applier::{ApplyOutcome, DispatchSequence, PresetApplier, StaleResultPolicy};
pub use outputs::{AppliedPreset, CommandEqualizer, LoggingEqualizer, WatchEqualizer};
pub use presets::{GenrePresetTable, ResolvedPreset, DEFAULT_GENRE};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const NUM_BANDS: usize = 10;

/// Center frequency of each band, lowest first.
pub const BAND_FREQUENCIES_HZ: [u32; NUM_BANDS] =
    [60, 170, 310, 600, 1000, 3000, 6000, 12000, 14000, 16000];

pub const GAIN_MIN_DB: i8 = -12;
pub const GAIN_MAX_DB: i8 = 12;

/// Ten band gains in dB, ordered like [`BAND_FREQUENCIES_HZ`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Preset {
    gains: [i8; NUM_BANDS],
}

impl Preset {
    pub const FLAT: Preset = Preset::new([0; NUM_BANDS]);

    pub const fn new(gains: [i8; NUM_BANDS]) -> Self {
        Self { gains }
    }

    pub fn gains(&self) -> [i8; NUM_BANDS] {
        self.gains
    }

    pub fn is_flat(&self) -> bool {
        self.gains.iter().all(|g| *g == 0)
    }

    /// Pairs every gain with its band frequency.
    pub fn bands(&self) -> impl Iterator<Item = (u32, i8)> + '_ {
        BAND_FREQUENCIES_HZ.iter().copied().zip(self.gains.iter().copied())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gain) in self.gains.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gain)?;
        }
        write!(f, "]")
    }
}

/// Errors reported by an equalizer control.
#[derive(Debug, Error)]
pub enum EqualizerError {
    #[error("Equalizer unavailable: {0}")]
    Unavailable(String),

    #[error("Equalizer command exited with status {status:?}: {stderr}")]
    CommandFailed { status: Option<i32>, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can take a preset and make it the active equalizer setting.
///
/// Controls are write-only: the last successful call wins.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait EqualizerControl: Send + Sync {
    async fn apply(&self, preset: &Preset) -> Result<(), EqualizerError>;
}
