//! Shows: the named container for everything persisted.
//!
//! A show holds cues (via [`crate::store::CueStore`]), free-text show
//! notes, the timing recording, scene metadata and tag colors. Exactly
//! one show is current at a time; switching swaps the whole in-memory
//! model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-show JSON files and migrations
pub mod files;
/// Directory name percent-encoding
pub mod paths;
/// Global settings file
pub mod settings;

/// User metadata for one named scene
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneMeta {
    /// free-text scene notes
    #[serde(default)]
    pub notes: String,
    /// hex display color
    #[serde(default)]
    pub color: String,
}

/// One recorded cue firing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueTiming {
    /// displayed cue number
    pub cue_number: String,
    /// cue list it fired on
    pub cue_list: i32,
    /// label at recording time
    pub label: String,
    /// seconds from show start
    pub timestamp: f64,
    /// seconds since the previous recorded firing
    pub time_from_previous: f64,
}

/// The timing recording, exactly as persisted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingLog {
    /// recording is armed
    pub is_recording: bool,
    /// wall clock of the first firing, epoch milliseconds
    pub show_start_time: Option<f64>,
    /// timestamp of the most recent firing, seconds from start
    pub last_cue_time: Option<f64>,
    /// number of the most recent fired cue
    pub last_cue_number: Option<String>,
    /// one entry per recorded cue number
    pub cue_timings: Vec<CueTiming>,
}

impl TimingLog {
    /// total recorded show length, seconds
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.cue_timings.iter().map(|t| t.timestamp).fold(0.0, f64::max)
    }

    /// recorded entry for a cue number
    #[must_use]
    pub fn entry(&self, cue_number: &str) -> Option<&CueTiming> {
        self.cue_timings.iter().find(|t| t.cue_number == cue_number)
    }

    /// the entry recorded immediately after a cue number
    #[must_use]
    pub fn entry_after(&self, cue_number: &str) -> Option<&CueTiming> {
        self.cue_timings.iter()
            .position(|t| t.cue_number == cue_number)
            .and_then(|i| self.cue_timings.get(i + 1))
    }
}

/// Everything in a show besides the cues themselves
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShowData {
    /// show name (decoded, human form)
    pub name: String,
    /// free-text show notes
    pub notes: String,
    /// scene name -> metadata
    pub scenes: BTreeMap<String, SceneMeta>,
    /// tag -> hex color
    pub tag_colors: BTreeMap<String, String>,
    /// the timing recording
    pub timings: TimingLog,
}
