use lazy_static::lazy_static;
use std::collections::HashMap;

use super::{Preset, NUM_BANDS};

/// Table key used whenever no genre could be matched.
pub const DEFAULT_GENRE: &str = "default";

const BUILTIN_PRESETS: [(&str, [i8; NUM_BANDS]); 6] = [
    ("rock", [4, 3, 2, 0, -1, -1, 2, 3, 3, 4]),
    ("electronic", [4, 3, 1, 0, -2, -2, 0, 2, 4, 5]),
    ("classical", [0, 0, 0, 0, 0, 0, -2, -3, -3, -4]),
    ("jazz", [2, 1, 0, 1, 2, -1, -2, -1, 1, 2]),
    ("hiphop", [5, 4, 2, 1, -1, -1, 2, 1, 2, 3]),
    (DEFAULT_GENRE, [0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
];

lazy_static! {
    static ref BUILTIN_TABLE: GenrePresetTable = GenrePresetTable::from_entries(&BUILTIN_PRESETS);
}

/// A preset picked from the table, along with the key it was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPreset {
    pub key: &'static str,
    pub preset: Preset,
}

impl ResolvedPreset {
    pub fn is_default(&self) -> bool {
        self.key == DEFAULT_GENRE
    }
}

/// Immutable mapping from lowercase genre key to preset.
///
/// Lookups are exact and case-sensitive; callers lowercase the genre once when
/// they extract it. The `default` entry always exists.
#[derive(Debug)]
pub struct GenrePresetTable {
    entries: Vec<(&'static str, Preset)>,
    index: HashMap<&'static str, usize>,
    default_index: usize,
}

impl GenrePresetTable {
    /// The built-in table shared by the whole process.
    pub fn builtin() -> &'static GenrePresetTable {
        &BUILTIN_TABLE
    }

    fn from_entries(entries: &[(&'static str, [i8; NUM_BANDS])]) -> Self {
        let entries: Vec<(&'static str, Preset)> = entries
            .iter()
            .map(|(key, gains)| (*key, Preset::new(*gains)))
            .collect();
        let index: HashMap<&'static str, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (*key, i))
            .collect();
        let default_index = *index
            .get(DEFAULT_GENRE)
            .expect("preset table must contain a default entry");
        Self {
            entries,
            index,
            default_index,
        }
    }

    pub fn get(&self, key: &str) -> Option<Preset> {
        self.index.get(key).map(|i| self.entries[*i].1)
    }

    pub fn default_preset(&self) -> ResolvedPreset {
        let (key, preset) = self.entries[self.default_index];
        ResolvedPreset { key, preset }
    }

    /// Looks up `key`, falling back to the default entry.
    pub fn resolve(&self, key: &str) -> ResolvedPreset {
        match self.index.get(key) {
            Some(i) => {
                let (key, preset) = self.entries[*i];
                ResolvedPreset { key, preset }
            }
            None => self.default_preset(),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Preset)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
