//! On-disk layout and migrations.
//!
//! ```text
//! <root>/global_settings.json
//! <root>/<percent-encoded show name>/cues.json
//!                                   /show_notes.json
//!                                   /show_timings.json
//!                                   /scene-data.json
//!                                   /tag-colors.json
//! ```
//!
//! Load failures reset the affected file to empty rather than crash;
//! the in-memory model is always authoritative.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::enums::{CoreError, DEFAULT_SHOW};
use crate::show::paths::{decode_show_name, encode_show_name};
use crate::show::settings::GlobalSettings;
use crate::show::{SceneMeta, TimingLog};
use crate::store::Cue;

/// cue records file
const CUES_FILE: &str = "cues.json";
/// show notes file
const NOTES_FILE: &str = "show_notes.json";
/// timing recording file
const TIMINGS_FILE: &str = "show_timings.json";
/// scene metadata file
const SCENES_FILE: &str = "scene-data.json";
/// tag color file
const TAGS_FILE: &str = "tag-colors.json";
/// global settings file
const SETTINGS_FILE: &str = "global_settings.json";

/// wrapper shape of `show_notes.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct NotesFile {
    /// the notes text
    #[serde(default)]
    notes: String,
}

/// The data root and every file under it
#[derive(Debug, Clone)]
pub struct ShowFiles {
    /// directory holding the global file and the show directories
    root: PathBuf,
}

impl ShowFiles {
    /// Use an explicit data root (tests, embedding apps)
    #[must_use]
    pub fn new(root: PathBuf) -> Self { Self { root } }

    /// Platform data directory, `cuemirror` subfolder
    #[must_use]
    pub fn default_location() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cuemirror");
        Self { root }
    }

    /// the data root path
    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// directory for one show
    fn show_dir(&self, show: &str) -> PathBuf {
        self.root.join(encode_show_name(show))
    }

    /// Create the show directory so an empty show exists on disk
    pub fn ensure_show(&self, show: &str) {
        if let Err(error) = fs::create_dir_all(self.show_dir(show)) {
            warn!(show, %error, "show directory not created");
        }
    }

    /// Every show directory present on disk, as decoded names
    #[must_use]
    pub fn list_shows(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else { return vec![] };

        let mut shows: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .map(|name| decode_show_name(&name))
            .collect();
        shows.sort();
        shows
    }

    /// One-time startup pass: move pre-show legacy files into the
    /// default show, and re-encode directory names written before the
    /// encoding was fixed
    pub fn migrate(&self) {
        let legacy = [CUES_FILE, NOTES_FILE, TIMINGS_FILE];
        if legacy.iter().any(|f| self.root.join(f).is_file()) {
            let target = self.show_dir(DEFAULT_SHOW);
            if let Err(error) = fs::create_dir_all(&target) {
                warn!(%error, "legacy migration skipped");
                return;
            }
            for file in legacy {
                let from = self.root.join(file);
                if from.is_file() {
                    match fs::rename(&from, target.join(file)) {
                        Ok(()) => info!(file, "migrated legacy file into the default show"),
                        Err(error) => warn!(file, %error, "legacy file not migrated"),
                    }
                }
            }
        }

        let Ok(entries) = fs::read_dir(&self.root) else { return };
        for entry in entries.filter_map(Result::ok).filter(|e| e.path().is_dir()) {
            let Ok(name) = entry.file_name().into_string() else { continue };
            let canonical = encode_show_name(&decode_show_name(&name));
            if canonical != name {
                match fs::rename(entry.path(), self.root.join(&canonical)) {
                    Ok(()) => info!(from = %name, to = %canonical, "re-encoded show directory"),
                    Err(error) => warn!(dir = %name, %error, "show directory not re-encoded"),
                }
            }
        }
    }

    /// Read one JSON file; missing or unparseable falls back to the
    /// default with a warning
    fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
        match fs::read(path) {
            Err(_) => T::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|error| {
                warn!(path = %path.display(), %error, "unreadable data file reset to empty");
                T::default()
            }),
        }
    }

    /// Serialize and write one JSON file, creating the show directory
    ///
    /// # Errors
    /// disk or serialization failure; callers decide whether to
    /// swallow it
    fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_vec_pretty(value)?)?;
        Ok(())
    }

    /// cues of one show
    #[must_use]
    pub fn load_cues(&self, show: &str) -> Vec<Cue> {
        Self::load_or_default(&self.show_dir(show).join(CUES_FILE))
    }

    /// write the cues of one show
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_cues(&self, show: &str, cues: &[Cue]) -> Result<(), CoreError> {
        Self::save(&self.show_dir(show).join(CUES_FILE), &cues)
    }

    /// notes of one show
    #[must_use]
    pub fn load_notes(&self, show: &str) -> String {
        Self::load_or_default::<NotesFile>(&self.show_dir(show).join(NOTES_FILE)).notes
    }

    /// write the notes of one show
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_notes(&self, show: &str, notes: &str) -> Result<(), CoreError> {
        Self::save(&self.show_dir(show).join(NOTES_FILE), &NotesFile { notes: notes.to_owned() })
    }

    /// timing recording of one show
    #[must_use]
    pub fn load_timings(&self, show: &str) -> TimingLog {
        Self::load_or_default(&self.show_dir(show).join(TIMINGS_FILE))
    }

    /// write the timing recording of one show
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_timings(&self, show: &str, timings: &TimingLog) -> Result<(), CoreError> {
        Self::save(&self.show_dir(show).join(TIMINGS_FILE), timings)
    }

    /// scene metadata of one show
    #[must_use]
    pub fn load_scenes(&self, show: &str) -> BTreeMap<String, SceneMeta> {
        Self::load_or_default(&self.show_dir(show).join(SCENES_FILE))
    }

    /// write the scene metadata of one show
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_scenes(&self, show: &str, scenes: &BTreeMap<String, SceneMeta>) -> Result<(), CoreError> {
        Self::save(&self.show_dir(show).join(SCENES_FILE), scenes)
    }

    /// tag colors of one show
    #[must_use]
    pub fn load_tag_colors(&self, show: &str) -> BTreeMap<String, String> {
        Self::load_or_default(&self.show_dir(show).join(TAGS_FILE))
    }

    /// write the tag colors of one show
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_tag_colors(&self, show: &str, tags: &BTreeMap<String, String>) -> Result<(), CoreError> {
        Self::save(&self.show_dir(show).join(TAGS_FILE), tags)
    }

    /// the global settings file
    #[must_use]
    pub fn load_settings(&self) -> GlobalSettings {
        Self::load_or_default(&self.root.join(SETTINGS_FILE))
    }

    /// write the global settings file
    ///
    /// # Errors
    /// disk or serialization failure
    pub fn save_settings(&self, settings: &GlobalSettings) -> Result<(), CoreError> {
        Self::save(&self.root.join(SETTINGS_FILE), settings)
    }
}
