//! Cue records and the merge store.
//!
//! The console is authoritative for cue existence and its own fields;
//! user annotations live only here. The merge rules below are what
//! keeps one from trampling the other across refreshes.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{DEFAULT_CUE_COLOR, LastSeen};
use crate::eos::records::CueUpdate;

/// Primary key of a cue: (list, displayed number, part)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CueKey {
    /// cue list number
    pub list: i32,
    /// displayed cue number
    pub number: String,
    /// part number, 0 = main cue
    pub part: u32,
}

/// serde default for the cue color
fn default_color() -> String { DEFAULT_CUE_COLOR.to_owned() }

/// One mirrored cue with its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// cue list number
    pub cue_list: i32,
    /// displayed cue number
    pub cue_number: String,
    /// part number, 0 = main cue
    #[serde(default)]
    pub part_number: u32,

    // console-owned
    /// cue label
    #[serde(default)]
    pub label: String,
    /// console-assigned unique id
    #[serde(default)]
    pub uid: String,
    /// intensity upfade seconds
    pub up_duration: Option<f64>,
    /// intensity upfade delay seconds
    pub up_delay: Option<f64>,
    /// intensity downfade seconds
    pub down_duration: Option<f64>,
    /// intensity downfade delay seconds
    pub down_delay: Option<f64>,
    /// focus fade seconds
    pub focus_duration: Option<f64>,
    /// focus delay seconds
    pub focus_delay: Option<f64>,
    /// color fade seconds
    pub color_duration: Option<f64>,
    /// color delay seconds
    pub color_delay: Option<f64>,
    /// beam fade seconds
    pub beam_duration: Option<f64>,
    /// beam delay seconds
    pub beam_delay: Option<f64>,
    /// mark flag text, empty = unset
    #[serde(default)]
    pub mark: String,
    /// block flag text, empty = unset
    #[serde(default)]
    pub block: String,
    /// assert flag text, empty = unset
    #[serde(default, rename = "assert")]
    pub assert_flag: String,
    /// follow time seconds
    pub follow_time: Option<f64>,
    /// hang time seconds
    pub hang_time: Option<f64>,
    /// number of parts under this cue
    #[serde(default)]
    pub part_count: u32,
    /// scene name carried on the first cue of a scene
    #[serde(default)]
    pub scene: String,
    /// last cue of a scene
    #[serde(default)]
    pub scene_end: bool,
    /// max of the five fade durations
    pub duration: Option<f64>,
    /// fade seconds captured from active/pending text
    pub fade_time: Option<f64>,

    // user-owned
    /// free-text notes (tiny markup: *bold*, _italic_, ~strike~)
    #[serde(default)]
    pub notes: String,
    /// hex color; `#ffffff` means none
    #[serde(default = "default_color")]
    pub color: String,
    /// tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// page reference
    #[serde(default)]
    pub page: String,
    /// attached image path
    #[serde(default)]
    pub image_path: String,

    /// runtime playback state; never persisted
    #[serde(skip)]
    pub last_seen: Option<LastSeen>,
}

impl Cue {
    /// New cue with user fields at their defaults
    #[must_use]
    pub fn new(key: &CueKey) -> Self {
        Self {
            cue_list: key.list,
            cue_number: key.number.clone(),
            part_number: key.part,
            label: String::new(),
            uid: String::new(),
            up_duration: None,
            up_delay: None,
            down_duration: None,
            down_delay: None,
            focus_duration: None,
            focus_delay: None,
            color_duration: None,
            color_delay: None,
            beam_duration: None,
            beam_delay: None,
            mark: String::new(),
            block: String::new(),
            assert_flag: String::new(),
            follow_time: None,
            hang_time: None,
            part_count: 0,
            scene: String::new(),
            scene_end: false,
            duration: None,
            fade_time: None,
            notes: String::new(),
            color: default_color(),
            tags: BTreeSet::new(),
            page: String::new(),
            image_path: String::new(),
            last_seen: None,
        }
    }

    /// This cue's key
    #[must_use]
    pub fn key(&self) -> CueKey {
        CueKey {
            list: self.cue_list,
            number: self.cue_number.clone(),
            part: self.part_number,
        }
    }

    /// Fold one console payload in. Console-owned fields take the
    /// payload value wholesale, empty included; user-owned fields are
    /// never touched here, which is the whole protection they get and
    /// need.
    pub fn apply_update(&mut self, update: &CueUpdate) {
        self.uid = update.uid.clone().unwrap_or_default();
        self.label = update.label.clone().unwrap_or_default();

        self.up_duration = update.up_duration;
        self.up_delay = update.up_delay;
        self.down_duration = update.down_duration;
        self.down_delay = update.down_delay;
        self.focus_duration = update.focus_duration;
        self.focus_delay = update.focus_delay;
        self.color_duration = update.color_duration;
        self.color_delay = update.color_delay;
        self.beam_duration = update.beam_duration;
        self.beam_delay = update.beam_delay;

        self.mark = update.mark.clone().unwrap_or_default();
        self.block = update.block.clone().unwrap_or_default();
        self.assert_flag = update.assert_flag.clone().unwrap_or_default();

        self.follow_time = update.follow_time;
        self.hang_time = update.hang_time;
        self.part_count = update.part_count.unwrap_or_default();
        self.scene = update.scene.clone().unwrap_or_default();
        self.scene_end = update.scene_end.unwrap_or_default();
        self.duration = update.duration;
    }
}

/// Order cue numbers numerically ("10" after "9.5"), strings as a tie
/// break for anything unparseable
fn cue_number_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

/// The in-memory cue collection for the current show
#[derive(Debug, Clone, Default)]
pub struct CueStore {
    /// every mirrored cue, kept sorted
    cues: Vec<Cue>,
}

impl CueStore {
    /// New empty store
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Replace the whole collection (show switch / load)
    pub fn replace(&mut self, cues: Vec<Cue>) {
        self.cues = cues;
        self.sort();
    }

    /// cue count
    #[must_use]
    pub fn len(&self) -> usize { self.cues.len() }

    /// is the store empty
    #[must_use]
    pub fn is_empty(&self) -> bool { self.cues.is_empty() }

    /// every cue, sorted
    #[must_use]
    pub fn all(&self) -> &[Cue] { &self.cues }

    /// cues belonging to one list
    pub fn in_list(&self, list: i32) -> impl Iterator<Item = &Cue> {
        self.cues.iter().filter(move |c| c.cue_list == list)
    }

    /// first cue matching a predicate
    pub fn find<P>(&self, predicate: P) -> Option<&Cue> where
        P: Fn(&Cue) -> bool
    {
        self.cues.iter().find(|c| predicate(c))
    }

    /// cue by key
    #[must_use]
    pub fn get(&self, key: &CueKey) -> Option<&Cue> {
        self.cues.iter().find(|c| c.key() == *key)
    }

    /// mutable cue by key
    fn get_mut(&mut self, key: &CueKey) -> Option<&mut Cue> {
        self.cues.iter_mut().find(|c| c.key() == *key)
    }

    /// Fold one console payload into the store, creating the record
    /// (and a part-0 stub for an orphaned part) when missing
    pub fn upsert(&mut self, update: &CueUpdate) {
        let key = CueKey {
            list: update.list,
            number: update.number.clone(),
            part: update.part,
        };

        if update.part > 0 {
            let parent = CueKey { part: 0, ..key.clone() };
            if self.get(&parent).is_none() {
                self.cues.push(Cue::new(&parent));
            }
        }

        match self.get_mut(&key) {
            Some(cue) => cue.apply_update(update),
            None => {
                let mut cue = Cue::new(&key);
                cue.apply_update(update);
                self.cues.push(cue);
            },
        }
        self.sort();
    }

    /// Remove every cue in `list` whose number is not in `kept`.
    /// Other lists are untouched.
    pub fn evict<S: std::hash::BuildHasher>(&mut self, list: i32, kept: &std::collections::HashSet<String, S>) {
        self.cues.retain(|c| c.cue_list != list || kept.contains(&c.cue_number));
    }

    /// Mark one cue as the list's active or pending cue. Clears the
    /// state from every other cue in that list first, so each list has
    /// at most one of each. Creates a stub when the cue is unknown.
    pub fn mark_seen(&mut self, list: i32, number: &str, state: LastSeen) {
        self.clear_seen(list, state);

        let key = CueKey { list, number: number.to_owned(), part: 0 };
        match self.get_mut(&key) {
            Some(cue) => cue.last_seen = Some(state),
            None => {
                let mut cue = Cue::new(&key);
                cue.last_seen = Some(state);
                self.cues.push(cue);
                self.sort();
            },
        }
    }

    /// Clear one state from one list only
    pub fn clear_seen(&mut self, list: i32, state: LastSeen) {
        for cue in self.cues.iter_mut().filter(|c| c.cue_list == list) {
            if cue.last_seen == Some(state) {
                cue.last_seen = None;
            }
        }
    }

    /// The cue currently marked with a state in a list
    #[must_use]
    pub fn seen_in_list(&self, list: i32, state: LastSeen) -> Option<&Cue> {
        self.cues.iter().find(|c| c.cue_list == list && c.last_seen == Some(state))
    }

    /// Write the captured fade seconds on a cue
    pub fn set_fade_time(&mut self, list: i32, number: &str, fade: f64) {
        let key = CueKey { list, number: number.to_owned(), part: 0 };
        if let Some(cue) = self.get_mut(&key) {
            cue.fade_time = Some(fade);
        }
    }

    /// Update a user-owned field; false when the cue is unknown
    pub fn annotate<F>(&mut self, key: &CueKey, write: F) -> bool where
        F: FnOnce(&mut Cue)
    {
        self.get_mut(key).map(write).is_some()
    }

    /// by list (numeric), then cue number (numeric, decimals), then part
    fn sort(&mut self) {
        self.cues.sort_by(|a, b| {
            a.cue_list.cmp(&b.cue_list)
                .then_with(|| cue_number_order(&a.cue_number, &b.cue_number))
                .then_with(|| a.part_number.cmp(&b.part_number))
        });
    }
}
