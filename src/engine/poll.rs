//! Active/pending polling fallback.
//!
//! Consoles push active-cue updates only when subscribed state works
//! out; polling covers the rest. One request is in flight at a time;
//! a response that misses its window is still consumed by the normal
//! parser, the timeout only frees the slot.

use std::collections::{BTreeSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::enums::LastSeen;
use crate::eos::ConsoleRequest;
use crate::osc::Buffer;

/// poll ticker cadence
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// how long one poll owns the slot
pub const POLL_TIMEOUT: Duration = Duration::from_millis(600);

/// Round-robin poller over the discovered lists
#[derive(Debug, Default)]
pub struct Poller {
    /// polls not yet sent this round
    queue: VecDeque<(i32, LastSeen)>,
    /// the outstanding poll and its give-up time
    in_flight: Option<(i32, LastSeen, Instant)>,
}

impl Poller {
    /// new empty poller
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// forget everything (transport lost)
    pub fn clear(&mut self) {
        self.queue.clear();
        self.in_flight = None;
    }

    /// The list the outstanding poll addressed, for text replies that
    /// carry no list of their own
    #[must_use]
    pub fn context(&self, kind: LastSeen) -> Option<i32> {
        self.in_flight
            .as_ref()
            .filter(|(_, k, _)| *k == kind)
            .map(|(list, _, _)| *list)
    }

    /// A matching response arrived; free the slot
    pub fn consume(&mut self, list: Option<i32>, kind: LastSeen) {
        if let Some((polled, polled_kind, _)) = self.in_flight {
            if polled_kind == kind && list.is_none_or(|l| l == polled) {
                self.in_flight = None;
            }
        }
    }

    /// One ticker step: expire the slot, then send the next poll
    pub fn tick(&mut self, now: Instant, lists: &BTreeSet<i32>, outbox: &mut Vec<Buffer>) {
        if let Some((list, kind, deadline)) = self.in_flight {
            if now < deadline {
                return;
            }
            debug!(list, ?kind, "poll timed out; advancing");
            self.in_flight = None;
        }

        if self.queue.is_empty() {
            for list in lists {
                self.queue.push_back((*list, LastSeen::Active));
                self.queue.push_back((*list, LastSeen::Pending));
            }
        }

        let Some((list, kind)) = self.queue.pop_front() else { return };

        outbox.extend(match kind {
            LastSeen::Active => ConsoleRequest::ActiveCue(list),
            LastSeen::Pending => ConsoleRequest::PendingCue(list),
        });
        self.in_flight = Some((list, kind, now + POLL_TIMEOUT));
    }
}
