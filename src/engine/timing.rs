//! Timing recording and countdown playback.
//!
//! Only the main playback list produces timing records; active cues on
//! secondary lists would otherwise leave ghost entries. Recording
//! keys entries by cue number: re-firing a cue updates its entry in
//! place.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::show::CueTiming;
use crate::store::CueKey;

use super::Engine;

/// countdown recompute cadence
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime playback/recording anchors; never persisted
#[derive(Debug, Default)]
pub struct Playback {
    /// wall anchor of the recording in progress
    pub show_start: Option<Instant>,
    /// recorded timestamp of the cue that last fired (playback)
    pub current_elapsed: f64,
    /// wall clock of the last main-list firing (playback)
    pub last_fire: Option<Instant>,
    /// number of the active main-list cue (playback)
    pub active_number: Option<String>,
    /// most recent countdown computation
    pub latest: Option<CountdownSnapshot>,
}

/// One countdown computation against the recorded schedule
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSnapshot {
    /// seconds into the show, extrapolated from the last firing
    pub show_elapsed: f64,
    /// seconds until the next recorded firing, may be negative when
    /// the show runs long
    pub time_to_next: Option<f64>,
    /// recorded total minus elapsed
    pub estimated_remaining: f64,
    /// active main-list cue number
    pub active_cue: String,
    /// `time_to_next` clamped at zero, for display
    pub countdown: Option<f64>,
}

/// current wall clock as epoch milliseconds, for the persisted record
#[expect(clippy::cast_precision_loss)]
fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_millis() as f64)
}

impl Engine {
    /// An active cue landed; feed the recorder or the countdown
    pub(super) fn timing_on_active(&mut self, list: i32, number: &str, now: Instant) {
        let Some(main) = self.settings.main_list() else { return };

        if self.show.timings.is_recording {
            self.record_firing(main, list, number, now);
        } else {
            self.playback_firing(main, list, number, now);
        }
    }

    /// Recording path: timestamp main-list transitions
    fn record_firing(&mut self, main: i32, list: i32, number: &str, now: Instant) {
        // the clock starts at the first active cue, whatever list it is on
        let show_start = *self.playback.show_start.get_or_insert_with(|| {
            self.show.timings.show_start_time = Some(epoch_millis());
            now
        });

        if list != main {
            // secondary-list event; never a timing record
            return;
        }
        if self.show.timings.last_cue_number.as_deref() == Some(number) {
            return;
        }

        let timestamp = now.duration_since(show_start).as_secs_f64();
        let time_from_previous = self.show.timings.last_cue_time
            .map_or(0.0, |last| timestamp - last);

        let label = self.cues
            .get(&CueKey { list, number: number.to_owned(), part: 0 })
            .map(|c| c.label.clone())
            .unwrap_or_default();

        let timings = &mut self.show.timings;
        match timings.cue_timings.iter_mut().find(|t| t.cue_number == number) {
            Some(entry) => {
                entry.timestamp = timestamp;
                entry.time_from_previous = time_from_previous;
                entry.label = label;
            },
            None => timings.cue_timings.push(CueTiming {
                cue_number: number.to_owned(),
                cue_list: list,
                label,
                timestamp,
                time_from_previous,
            }),
        }

        timings.last_cue_time = Some(timestamp);
        timings.last_cue_number = Some(number.to_owned());
        self.persist_timings();
    }

    /// Playback path: re-anchor the countdown on main-list firings
    fn playback_firing(&mut self, main: i32, list: i32, number: &str, now: Instant) {
        if list != main || self.show.timings.cue_timings.is_empty() {
            return;
        }

        if let Some(entry) = self.show.timings.entry(number) {
            self.playback.current_elapsed = entry.timestamp;
        }
        self.playback.last_fire = Some(now);
        self.playback.active_number = Some(number.to_owned());
    }

    /// The 1 Hz countdown computation
    pub(super) fn compute_countdown(&self, now: Instant) -> Option<CountdownSnapshot> {
        if self.show.timings.is_recording || self.show.timings.cue_timings.is_empty() {
            return None;
        }

        let last_fire = self.playback.last_fire?;
        let active_number = self.playback.active_number.clone()?;

        let show_elapsed = self.playback.current_elapsed + now.duration_since(last_fire).as_secs_f64();
        let timings = &self.show.timings;

        let time_to_next = timings.entry(&active_number).and_then(|active| {
            timings.entry_after(&active_number)
                .map(|next| next.time_from_previous - (show_elapsed - active.timestamp))
        });

        Some(CountdownSnapshot {
            show_elapsed,
            time_to_next,
            estimated_remaining: timings.total_time() - show_elapsed,
            active_cue: active_number,
            countdown: time_to_next.map(|t| t.max(0.0)),
        })
    }

    /// Arm the recorder. Existing entries stay and update in place on
    /// re-fire; the clock re-anchors at the next active cue.
    pub fn start_recording(&mut self) {
        info!("timing recording started");
        self.show.timings.is_recording = true;
        self.show.timings.last_cue_time = None;
        self.show.timings.last_cue_number = None;
        self.playback.show_start = None;
        self.persist_timings();
    }

    /// Disarm the recorder
    pub fn stop_recording(&mut self) {
        info!("timing recording stopped");
        self.show.timings.is_recording = false;
        self.playback.show_start = None;
        self.persist_timings();
    }

    /// Drop every recorded entry
    pub fn clear_timings(&mut self) {
        self.show.timings = crate::show::TimingLog::default();
        self.playback = Playback::default();
        self.persist_timings();
    }

    /// most recent countdown snapshot, recomputed at 1 Hz
    #[must_use]
    pub fn countdown(&self) -> Option<&CountdownSnapshot> {
        self.playback.latest.as_ref()
    }

    /// the timing recording as persisted
    #[must_use]
    pub fn timings(&self) -> &crate::show::TimingLog {
        &self.show.timings
    }

    /// Write the timings file now; failures are logged, memory stays
    /// authoritative
    pub(super) fn persist_timings(&self) {
        if let Err(error) = self.files.save_timings(&self.show.name, &self.show.timings) {
            warn!(%error, "timings not persisted");
        }
    }
}
