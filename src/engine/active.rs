//! Active/pending cue application.
//!
//! Updates arrive as per-list pushes, or as display text whose list
//! may be implied by the address or by the outstanding poll. All
//! clearing is scoped to one list; lists never wipe each other.

use std::time::Instant;

use tracing::debug;

use crate::enums::LastSeen;
use crate::eos::text::{self, CueTextOutcome};

use super::Engine;

impl Engine {
    /// A per-list active/pending push or poll reply
    pub(super) fn handle_seen(&mut self, list: i32, number: &str, state: LastSeen, now: Instant) {
        self.cues.mark_seen(list, number, state);
        self.poll.consume(Some(list), state);

        if state == LastSeen::Active {
            self.timing_on_active(list, number, now);
        }
    }

    /// A display-text active/pending payload
    pub(super) fn handle_text(&mut self, list: Option<i32>, text: &str, state: LastSeen, now: Instant) {
        let context = list.or_else(|| self.poll.context(state));

        match text::parse(text) {
            CueTextOutcome::Reset => {
                // "no cue" clears this slot for the contextual list only
                if let Some(l) = context {
                    self.cues.clear_seen(l, state);
                }
                self.poll.consume(list, state);
            },
            CueTextOutcome::Info(info) => {
                let Some(l) = info.list.or(context) else {
                    debug!(?state, text, "cue text without a contextual list dropped");
                    return;
                };

                self.cues.mark_seen(l, &info.number, state);

                if let Some(fade) = info.fade {
                    // fades read off pending text, or active text that
                    // has not started moving yet
                    if state == LastSeen::Pending || info.percent == Some(0) {
                        self.cues.set_fade_time(l, &info.number, fade);
                        self.mark_cues_dirty(now);
                    }
                }

                if state == LastSeen::Active {
                    self.timing_on_active(l, &info.number, now);
                }
                self.poll.consume(Some(l), state);
            },
        }
    }
}
