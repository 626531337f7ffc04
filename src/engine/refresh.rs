//! Bulk cue retrieval, one list at a time.
//!
//! The protocol is count → indexed fetches → completion → cleanup.
//! Responses carry no correlation ids, so the state machine decides
//! from (list, index, count) alone whether a payload credits the
//! running refresh, merely updates the store, or is stale and must be
//! dropped.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::eos::records::CueUpdate;
use crate::eos::ConsoleRequest;
use crate::osc::Buffer;

/// wait for a count reply before falling back
pub const COUNT_TIMEOUT: Duration = Duration::from_secs(5);
/// wait after the fallback requests before giving up
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(5);
/// indexed fetches per batch
pub const BATCH_SIZE: usize = 10;
/// pause between batches
pub const BATCH_INTERVAL: Duration = Duration::from_millis(50);
/// completion allowance per expected cue
pub const PER_CUE_TIMEOUT: Duration = Duration::from_millis(100);
/// completion allowance floor
pub const MIN_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a refresh stands
#[derive(Debug, Clone)]
enum RefreshState {
    /// nothing running
    Idle,
    /// count requested, nothing received yet
    AwaitingCount {
        /// list being refreshed
        list: i32,
        /// give-up time for this stage
        deadline: Instant,
        /// the fallback requests went out already
        fallback_sent: bool,
    },
    /// count known, indexed fetches in flight
    Fetching {
        /// list being refreshed
        list: i32,
        /// count the console reported
        expected: usize,
        /// indices credited so far
        received_indices: HashSet<usize>,
        /// cue numbers seen so far; the eviction keep-set
        received_numbers: HashSet<String>,
        /// completion give-up time
        deadline: Instant,
        /// next index to request
        next_index: usize,
        /// earliest time for the next batch
        next_batch_at: Instant,
    },
}

/// What to do with one cue payload
#[derive(Debug)]
pub enum Disposition {
    /// stale for the running refresh; do not upsert
    Drop,
    /// fold into the store; `completed` carries the cleanup when this
    /// payload finished the refresh
    Upsert {
        /// eviction pass to run, when the refresh just completed
        completed: Option<Cleanup>,
    },
}

/// Eviction order produced by a completed refresh
#[derive(Debug, Clone)]
pub struct Cleanup {
    /// list that finished
    pub list: i32,
    /// cue numbers that survive
    pub kept: HashSet<String>,
}

/// Timer outcome
#[derive(Debug)]
pub enum TickOutcome {
    /// nothing due
    None,
    /// count never arrived; no eviction pass
    Failed(i32),
    /// completion timeout hit; evict from what arrived
    Completed(Cleanup),
}

/// Serialized refresh driver for all lists
#[derive(Debug)]
pub struct RefreshEngine {
    /// current stage
    state: RefreshState,
    /// lists waiting their turn
    queue: VecDeque<i32>,
    /// last known count per list, for change detection
    counts: HashMap<i32, usize>,
}

impl Default for RefreshEngine {
    fn default() -> Self { Self::new() }
}

impl RefreshEngine {
    /// new idle engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefreshState::Idle,
            queue: VecDeque::new(),
            counts: HashMap::new(),
        }
    }

    /// no refresh running
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, RefreshState::Idle)
    }

    /// list currently being refreshed
    #[must_use]
    pub fn active_list(&self) -> Option<i32> {
        match &self.state {
            RefreshState::Idle => None,
            RefreshState::AwaitingCount { list, .. } | RefreshState::Fetching { list, .. } => Some(*list),
        }
    }

    /// last count the console reported for a list
    #[must_use]
    pub fn known_count(&self, list: i32) -> Option<usize> {
        self.counts.get(&list).copied()
    }

    /// Abandon everything (transport lost)
    pub fn reset(&mut self) {
        self.state = RefreshState::Idle;
        self.queue.clear();
    }

    /// Ask for a refresh of one list. Runs now when idle, otherwise
    /// queues it, deduplicating against the queue and the active list.
    pub fn request(&mut self, list: i32, now: Instant, outbox: &mut Vec<Buffer>) {
        if self.active_list() == Some(list) || self.queue.contains(&list) {
            debug!(list, "refresh already scheduled");
            return;
        }

        if self.is_idle() {
            self.begin(list, now, outbox);
        } else {
            self.queue.push_back(list);
        }
    }

    /// Start the per-list protocol: ask for the count
    fn begin(&mut self, list: i32, now: Instant, outbox: &mut Vec<Buffer>) {
        info!(list, "cue refresh started");
        outbox.extend(ConsoleRequest::CueCount(list));
        self.state = RefreshState::AwaitingCount {
            list,
            deadline: now + COUNT_TIMEOUT,
            fallback_sent: false,
        };
    }

    /// Pop the next queued list, if any
    fn conclude(&mut self, now: Instant, outbox: &mut Vec<Buffer>) {
        self.state = RefreshState::Idle;
        if let Some(next) = self.queue.pop_front() {
            self.begin(next, now, outbox);
        }
    }

    /// A count reply arrived
    pub fn on_count(&mut self, list: i32, count: usize, now: Instant, outbox: &mut Vec<Buffer>) -> Option<Cleanup> {
        self.counts.insert(list, count);

        match &self.state {
            RefreshState::AwaitingCount { list: awaiting, .. } if *awaiting == list => {
                if count == 0 {
                    // nothing to fetch; evict the lot
                    let cleanup = Cleanup { list, kept: HashSet::new() };
                    self.conclude(now, outbox);
                    return Some(cleanup);
                }

                self.state = RefreshState::Fetching {
                    list,
                    expected: count,
                    received_indices: HashSet::new(),
                    received_numbers: HashSet::new(),
                    deadline: now + MIN_FETCH_TIMEOUT.max(PER_CUE_TIMEOUT * u32::try_from(count).unwrap_or(u32::MAX)),
                    next_index: 0,
                    next_batch_at: now,
                };
            },
            _ => debug!(list, count, "count outside a refresh"),
        }
        None
    }

    /// Route one cue payload (see [`Disposition`])
    pub fn on_cue_data(&mut self, update: &CueUpdate, now: Instant) -> Disposition {
        let state = std::mem::replace(&mut self.state, RefreshState::Idle);

        match state {
            RefreshState::AwaitingCount { list, fallback_sent, deadline } if list == update.list => {
                if !fallback_sent {
                    // payload racing the count request; stale
                    self.state = RefreshState::AwaitingCount { list, fallback_sent, deadline };
                    return Disposition::Drop;
                }

                // wildcard fallback answered first; its address suffix
                // carries the total count
                let expected = update.count.max(1);
                debug!(list, expected, "count recovered from wildcard reply");

                let mut received_indices = HashSet::new();
                received_indices.insert(update.index);
                let mut received_numbers = HashSet::new();
                received_numbers.insert(update.number.clone());

                self.state = RefreshState::Fetching {
                    list,
                    expected,
                    received_indices,
                    received_numbers,
                    deadline: now + MIN_FETCH_TIMEOUT.max(PER_CUE_TIMEOUT * u32::try_from(expected).unwrap_or(u32::MAX)),
                    // the wildcard already requested every cue
                    next_index: expected,
                    next_batch_at: now,
                };
                Disposition::Upsert { completed: self.complete_if_done() }
            },

            RefreshState::Fetching { list, expected, mut received_indices, mut received_numbers, deadline, next_index, next_batch_at } if list == update.list => {
                if update.index >= expected {
                    // stale payload from an earlier, larger session
                    self.state = RefreshState::Fetching { list, expected, received_indices, received_numbers, deadline, next_index, next_batch_at };
                    return Disposition::Drop;
                }

                received_indices.insert(update.index);
                received_numbers.insert(update.number.clone());
                self.state = RefreshState::Fetching { list, expected, received_indices, received_numbers, deadline, next_index, next_batch_at };
                Disposition::Upsert { completed: self.complete_if_done() }
            },

            // not the refresh target; fold in without crediting
            other => {
                self.state = other;
                Disposition::Upsert { completed: None }
            },
        }
    }

    /// Finish the running refresh when every expected index arrived
    fn complete_if_done(&mut self) -> Option<Cleanup> {
        let done = matches!(
            &self.state,
            RefreshState::Fetching { expected, received_indices, .. } if received_indices.len() >= *expected
        );
        done.then(|| self.complete())
    }

    /// Finish the running refresh, returning its eviction pass
    fn complete(&mut self) -> Cleanup {
        let RefreshState::Fetching { list, received_numbers, received_indices, expected, .. } = std::mem::replace(&mut self.state, RefreshState::Idle) else {
            unreachable!("complete() is only reached from Fetching");
        };

        info!(list, received = received_indices.len(), expected, "cue refresh complete");
        self.counts.insert(list, received_numbers.len());
        Cleanup { list, kept: received_numbers }
    }

    /// Drive deadlines and the batch cadence
    pub fn tick(&mut self, now: Instant, outbox: &mut Vec<Buffer>) -> TickOutcome {
        match &mut self.state {
            RefreshState::Idle => TickOutcome::None,

            RefreshState::AwaitingCount { list, deadline, fallback_sent } => {
                if now < *deadline {
                    return TickOutcome::None;
                }

                let list = *list;
                if *fallback_sent {
                    // two strikes; give up without evicting anything
                    warn!(list, "cue count never arrived; refresh failed");
                    self.conclude(now, outbox);
                    return TickOutcome::Failed(list);
                }

                debug!(list, "count timed out; sending fallback requests");
                outbox.extend(ConsoleRequest::CountFallback(list));
                self.state = RefreshState::AwaitingCount {
                    list,
                    deadline: now + FALLBACK_TIMEOUT,
                    fallback_sent: true,
                };
                TickOutcome::None
            },

            RefreshState::Fetching { list, expected, received_indices, next_index, next_batch_at, deadline, .. } => {
                if now >= *deadline {
                    let list = *list;
                    warn!(list, received = received_indices.len(), expected = *expected, "refresh completion timeout");
                    let cleanup = self.complete();
                    self.conclude(now, outbox);
                    return TickOutcome::Completed(cleanup);
                }

                if *next_index < *expected && now >= *next_batch_at {
                    let list = *list;
                    let end = (*next_index + BATCH_SIZE).min(*expected);
                    for i in *next_index..end {
                        outbox.extend(ConsoleRequest::CueIndex(list, i));
                    }
                    *next_index = end;
                    *next_batch_at = now + BATCH_INTERVAL;
                }
                TickOutcome::None
            },
        }
    }

    /// Advance the queue after an externally handled completion
    pub fn advance(&mut self, now: Instant, outbox: &mut Vec<Buffer>) {
        if self.is_idle() {
            self.conclude(now, outbox);
        }
    }
}
