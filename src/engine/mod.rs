//! The protocol engine.
//!
//! One `Engine` value owns every piece of mutable state: the cue
//! store, the current show, refresh and poll machinery, timing state
//! and the outbound message queue. The service task is its single
//! writer, so nothing here locks. Every entry point takes the current
//! `Instant`, which keeps the protocol deterministic under test.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::enums::{EosError, Error, LastSeen};
use crate::eos::{ConsoleEvent, ConsoleRequest};
use crate::osc::{Buffer, Message};
use crate::show::files::ShowFiles;
use crate::show::settings::{GlobalSettings, OscSettings};
use crate::show::{SceneMeta, ShowData};
use crate::store::{CueKey, CueStore};

/// active/pending scoping
mod active;
/// single in-flight poll slot
pub mod poll;
/// bulk retrieval state machine
pub mod refresh;
/// recording and countdown
pub mod timing;

pub use timing::CountdownSnapshot;

use poll::{Poller, POLL_INTERVAL};
use refresh::{Cleanup, Disposition, RefreshEngine, TickOutcome};
use timing::{Playback, COUNTDOWN_INTERVAL};

/// coalesce cue writes this long after the first dirty mark
pub const PERSIST_DEBOUNCE: Duration = Duration::from_secs(1);

/// The engine; see module docs
pub struct Engine {
    /// data root and files
    files: ShowFiles,
    /// global settings, persisted
    settings: GlobalSettings,
    /// mirrored cues of the current show
    cues: CueStore,
    /// everything else in the current show
    show: ShowData,
    /// bulk retrieval driver
    refresh: RefreshEngine,
    /// active/pending poll slot
    poll: Poller,
    /// runtime timing anchors
    playback: Playback,
    /// cue lists the console told us about
    discovered: BTreeSet<i32>,
    /// transport is up
    connected: bool,
    /// show file name the console reported
    console_show_name: Option<String>,
    /// console software version string
    console_version: Option<String>,
    /// encoded messages waiting for the transport
    outbox: Vec<Buffer>,
    /// first unsaved cue mutation, drives the debounce
    cues_dirty_at: Option<Instant>,
    /// next poll ticker step
    next_poll_at: Option<Instant>,
    /// next countdown recompute
    next_countdown_at: Option<Instant>,
}

impl Engine {
    /// Open the data root, run migrations, and load the last-used show
    #[must_use]
    pub fn new(files: ShowFiles) -> Self {
        files.migrate();
        let settings = files.load_settings();
        let show_name = settings.last_show_name.clone();

        let mut engine = Self {
            files,
            settings,
            cues: CueStore::new(),
            show: ShowData::default(),
            refresh: RefreshEngine::new(),
            poll: Poller::new(),
            playback: Playback::default(),
            discovered: BTreeSet::new(),
            connected: false,
            console_show_name: None,
            console_version: None,
            outbox: vec![],
            cues_dirty_at: None,
            next_poll_at: None,
            next_countdown_at: None,
        };
        engine.load_show(&show_name);
        engine
    }

    // MARK: transport lifecycle

    /// Transport reports the far side reachable; run the bootstrap
    pub fn on_transport_ready(&mut self, _now: Instant) {
        info!("console reachable; subscribing");
        self.connected = true;
        self.outbox.extend(ConsoleRequest::connect_sequence());
    }

    /// Transport lost; polls and refreshes go inert until reconnect
    pub fn on_transport_closed(&mut self) {
        warn!("console connection lost");
        self.connected = false;
        self.refresh.reset();
        self.poll.clear();
    }

    /// transport currently up
    #[must_use]
    pub fn connected(&self) -> bool { self.connected }

    // MARK: inbound

    /// Decode one framed message and apply it. Malformed payloads are
    /// dropped with a log entry; they never abort the loop.
    pub fn ingest(&mut self, buffer: Buffer, now: Instant) {
        let msg = match Message::try_from(buffer) {
            Ok(msg) => msg,
            Err(error) => {
                warn!(%error, "malformed osc payload dropped");
                return;
            },
        };

        let address = msg.address.clone();
        match ConsoleEvent::try_from(msg) {
            Ok(event) => self.handle_event(event, now),
            Err(Error::Eos(EosError::SuppressedFacet)) => {},
            Err(Error::Eos(EosError::SystemList)) => debug!(%address, "system list payload discarded"),
            Err(error) => debug!(%address, %error, "unhandled osc message"),
        }
    }

    /// Apply one decoded console event
    pub fn handle_event(&mut self, event: ConsoleEvent, now: Instant) {
        match event {
            ConsoleEvent::ShowName(name) => {
                info!(show = %name, "console show file");
                self.console_show_name = Some(name);
            },
            ConsoleEvent::Version(version) => {
                info!(version = %version, "console version");
                self.console_version = Some(version);
            },
            ConsoleEvent::CueListCount(count) => {
                debug!(count, "enumerating cue lists");
                for i in 0..count {
                    self.outbox.extend(ConsoleRequest::CueListIndex(i));
                }
            },
            ConsoleEvent::CueListDiscovered(list) => {
                if self.discovered.insert(list) {
                    info!(list, "cue list discovered");
                    self.refresh.request(list, now, &mut self.outbox);
                }
            },
            ConsoleEvent::CueCount { list, count } => {
                if let Some(cleanup) = self.refresh.on_count(list, count, now, &mut self.outbox) {
                    self.finish_refresh(&cleanup);
                }
            },
            ConsoleEvent::CueData(update) => {
                match self.refresh.on_cue_data(&update, now) {
                    Disposition::Drop => debug!(list = update.list, number = %update.number, "stale cue payload dropped"),
                    Disposition::Upsert { completed } => {
                        self.cues.upsert(&update);
                        self.mark_cues_dirty(now);
                        if let Some(cleanup) = completed {
                            self.finish_refresh(&cleanup);
                            self.refresh.advance(now, &mut self.outbox);
                        }
                    },
                }
            },
            ConsoleEvent::CueNotify { list, count, .. } => {
                let changed = self.refresh
                    .known_count(list)
                    .is_some_and(|known| known != 0 && known != count);
                if changed {
                    debug!(list, count, "console reports list changed");
                    self.refresh.request(list, now, &mut self.outbox);
                }
            },
            ConsoleEvent::ActiveCue { list, number } =>
                self.handle_seen(list, &number, LastSeen::Active, now),
            ConsoleEvent::PendingCue { list, number } =>
                self.handle_seen(list, &number, LastSeen::Pending, now),
            ConsoleEvent::ActiveCueText { list, text } =>
                self.handle_text(list, &text, LastSeen::Active, now),
            ConsoleEvent::PendingCueText { list, text } =>
                self.handle_text(list, &text, LastSeen::Pending, now),
            ConsoleEvent::FaderConfig { index, fader_type, target_id, label } => {
                if index == 0 && fader_type == 1 {
                    info!(target_id, label = %label, "main playback list from fader config");
                    self.settings.main_playback_list = target_id.to_string();
                    self.save_settings();
                } else {
                    debug!(index, fader_type, "fader config ignored");
                }
            },
        }
    }

    // MARK: timers

    /// One base-tick step: refresh deadlines and batches, the poll
    /// ticker, the countdown recompute, and the persistence debounce
    pub fn tick(&mut self, now: Instant) {
        match self.refresh.tick(now, &mut self.outbox) {
            TickOutcome::None => {},
            TickOutcome::Failed(list) => warn!(list, "refresh abandoned; keeping local state"),
            TickOutcome::Completed(cleanup) => self.finish_refresh(&cleanup),
        }

        if self.next_poll_at.is_none_or(|t| now >= t) {
            self.next_poll_at = Some(now + POLL_INTERVAL);
            if self.connected && self.refresh.is_idle() {
                self.poll.tick(now, &self.discovered, &mut self.outbox);
            }
        }

        if self.next_countdown_at.is_none_or(|t| now >= t) {
            self.next_countdown_at = Some(now + COUNTDOWN_INTERVAL);
            self.playback.latest = self.compute_countdown(now);
        }

        if self.cues_dirty_at.is_some_and(|t| now >= t + PERSIST_DEBOUNCE) {
            self.persist_cues();
            self.cues_dirty_at = None;
        }
    }

    /// Drain everything queued for the transport
    pub fn take_outbox(&mut self) -> Vec<Buffer> {
        std::mem::take(&mut self.outbox)
    }

    // MARK: refresh

    /// Ask for a bulk refresh of one list
    pub fn request_refresh(&mut self, list: i32, now: Instant) {
        self.refresh.request(list, now, &mut self.outbox);
    }

    /// a refresh is running or queued
    #[must_use]
    pub fn refresh_busy(&self) -> bool { !self.refresh.is_idle() }

    /// Run the eviction pass of a finished refresh and persist
    fn finish_refresh(&mut self, cleanup: &Cleanup) {
        self.cues.evict(cleanup.list, &cleanup.kept);
        self.persist_cues();
        self.cues_dirty_at = None;
    }

    // MARK: persistence

    /// Debounce anchor for the cue file
    pub(crate) fn mark_cues_dirty(&mut self, now: Instant) {
        self.cues_dirty_at.get_or_insert(now);
    }

    /// Write the cue file; failure is logged, memory stays authoritative
    fn persist_cues(&mut self) {
        if let Err(error) = self.files.save_cues(&self.show.name, self.cues.all()) {
            warn!(%error, "cue file not persisted");
        }
    }

    /// Synchronous flush for API-driven mutations
    pub fn persist_now(&mut self) {
        self.persist_cues();
        self.cues_dirty_at = None;
    }

    /// Write every file of the current show
    fn persist_all(&mut self) {
        self.persist_now();
        let name = self.show.name.clone();
        let results = [
            self.files.save_notes(&name, &self.show.notes),
            self.files.save_scenes(&name, &self.show.scenes),
            self.files.save_tag_colors(&name, &self.show.tag_colors),
            self.files.save_timings(&name, &self.show.timings),
        ];
        for error in results.into_iter().filter_map(Result::err) {
            warn!(%error, show = %name, "show file not persisted");
        }
    }

    /// Write the global settings file
    fn save_settings(&self) {
        if let Err(error) = self.files.save_settings(&self.settings) {
            warn!(%error, "settings not persisted");
        }
    }

    // MARK: shows

    /// Swap the whole model to another show, creating it when unknown
    pub fn switch_show(&mut self, name: &str) {
        if name == self.show.name {
            return;
        }

        self.persist_all();
        self.load_show(name);
        self.files.ensure_show(name);

        name.clone_into(&mut self.settings.last_show_name);
        self.save_settings();
        info!(show = name, "current show switched");
    }

    /// Load one show's files into memory
    fn load_show(&mut self, name: &str) {
        self.cues.replace(self.files.load_cues(name));
        self.show = ShowData {
            name: name.to_owned(),
            notes: self.files.load_notes(name),
            scenes: self.files.load_scenes(name),
            tag_colors: self.files.load_tag_colors(name),
            timings: self.files.load_timings(name),
        };
        self.playback = Playback::default();
        self.cues_dirty_at = None;
    }

    /// shows present on disk
    #[must_use]
    pub fn list_shows(&self) -> Vec<String> {
        self.files.list_shows()
    }

    /// name of the current show
    #[must_use]
    pub fn current_show(&self) -> &str { &self.show.name }

    /// free-text notes of the current show
    #[must_use]
    pub fn show_notes(&self) -> &str { &self.show.notes }

    /// Replace the show notes; written immediately
    pub fn set_show_notes(&mut self, notes: &str) {
        notes.clone_into(&mut self.show.notes);
        if let Err(error) = self.files.save_notes(&self.show.name, notes) {
            warn!(%error, "show notes not persisted");
        }
    }

    /// scene metadata of the current show
    #[must_use]
    pub fn scenes(&self) -> &std::collections::BTreeMap<String, SceneMeta> {
        &self.show.scenes
    }

    /// Set one scene's metadata; written immediately
    pub fn set_scene_meta(&mut self, scene: &str, meta: SceneMeta) {
        self.show.scenes.insert(scene.to_owned(), meta);
        if let Err(error) = self.files.save_scenes(&self.show.name, &self.show.scenes) {
            warn!(%error, "scene metadata not persisted");
        }
    }

    /// tag colors of the current show
    #[must_use]
    pub fn tag_colors(&self) -> &std::collections::BTreeMap<String, String> {
        &self.show.tag_colors
    }

    /// Set one tag's color; written immediately
    pub fn set_tag_color(&mut self, tag: &str, color: &str) {
        self.show.tag_colors.insert(tag.to_owned(), color.to_owned());
        if let Err(error) = self.files.save_tag_colors(&self.show.name, &self.show.tag_colors) {
            warn!(%error, "tag colors not persisted");
        }
    }

    // MARK: annotations

    /// Set a cue's notes; false when the cue is unknown
    pub fn set_cue_notes(&mut self, key: &CueKey, notes: &str, now: Instant) -> bool {
        let hit = self.cues.annotate(key, |c| notes.clone_into(&mut c.notes));
        if hit { self.mark_cues_dirty(now); }
        hit
    }

    /// Set a cue's display color; false when the cue is unknown
    pub fn set_cue_color(&mut self, key: &CueKey, color: &str, now: Instant) -> bool {
        let hit = self.cues.annotate(key, |c| color.clone_into(&mut c.color));
        if hit { self.mark_cues_dirty(now); }
        hit
    }

    /// Replace a cue's tag set; false when the cue is unknown
    pub fn set_cue_tags(&mut self, key: &CueKey, tags: BTreeSet<String>, now: Instant) -> bool {
        let hit = self.cues.annotate(key, |c| c.tags = tags);
        if hit { self.mark_cues_dirty(now); }
        hit
    }

    /// Set a cue's page reference; false when the cue is unknown
    pub fn set_cue_page(&mut self, key: &CueKey, page: &str, now: Instant) -> bool {
        let hit = self.cues.annotate(key, |c| page.clone_into(&mut c.page));
        if hit { self.mark_cues_dirty(now); }
        hit
    }

    /// Set a cue's image path; false when the cue is unknown
    pub fn set_cue_image(&mut self, key: &CueKey, path: &str, now: Instant) -> bool {
        let hit = self.cues.annotate(key, |c| path.clone_into(&mut c.image_path));
        if hit { self.mark_cues_dirty(now); }
        hit
    }

    // MARK: accessors

    /// the cue store
    #[must_use]
    pub fn cues(&self) -> &CueStore { &self.cues }

    /// global settings
    #[must_use]
    pub fn settings(&self) -> &GlobalSettings { &self.settings }

    /// Replace transport parameters; written immediately
    pub fn set_osc_settings(&mut self, osc: OscSettings) {
        self.settings.osc_settings = osc;
        self.save_settings();
    }

    /// User override of the main playback list; a fresh fader config
    /// from the console replaces it
    pub fn set_main_list(&mut self, list: &str) {
        list.clone_into(&mut self.settings.main_playback_list);
        self.save_settings();
    }

    /// cue lists seen so far
    #[must_use]
    pub fn discovered_lists(&self) -> &BTreeSet<i32> { &self.discovered }

    /// show file name the console reported, when known
    #[must_use]
    pub fn console_show_name(&self) -> Option<&str> {
        self.console_show_name.as_deref()
    }

    /// console version, when known
    #[must_use]
    pub fn console_version(&self) -> Option<&str> {
        self.console_version.as_deref()
    }
}
