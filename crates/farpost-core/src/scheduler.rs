//! Extraction completion timers.
//!
//! [`TimerQueue`] is the cancelable-timer seam: `schedule(deadline, token)`,
//! `cancel(token)`, and a way to drain everything that is due. The default
//! [`DeadlineQueue`] is a min-heap of deadlines with lazy deletion, but any
//! event loop or OS timer facility can stand behind the trait.
//!
//! [`ExtractionScheduler`] keeps at most one live timer per cell. Re-arming a
//! cell cancels its previous timer, and a firing timer checks the cell's state
//! at fire time, so a stale timer can never complete a cell that was
//! collected, reset, or re-deployed in the meantime.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use tracing::debug;

use farpost_economy::TimerDirective;
use farpost_economy::handlers::complete_extraction;
use farpost_ledger::PlayerLedger;
use farpost_types::GameEvent;

// ---------------------------------------------------------------------------
// Timer queue
// ---------------------------------------------------------------------------

/// Opaque handle for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

/// A cancelable one-shot timer facility.
pub trait TimerQueue: Send + core::fmt::Debug {
    /// Arm `token` to fire at `deadline`. Re-scheduling a live token moves it.
    fn schedule(&mut self, deadline: i64, token: TimerToken);

    /// Disarm `token`. Returns whether it was live.
    fn cancel(&mut self, token: TimerToken) -> bool;

    /// Remove and return every live token due at or before `now`, earliest
    /// first.
    fn pop_due(&mut self, now: i64) -> Vec<TimerToken>;

    /// The earliest live deadline.
    fn next_deadline(&self) -> Option<i64>;

    /// Disarm everything.
    fn clear(&mut self);
}

/// Priority queue of deadlines.
///
/// Cancelled and moved entries stay in the heap and are skipped when popped;
/// `live` is the source of truth.
#[derive(Debug, Default)]
pub struct DeadlineQueue {
    heap: BinaryHeap<Reverse<(i64, TimerToken)>>,
    live: BTreeMap<TimerToken, i64>,
}

impl DeadlineQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timers are live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl TimerQueue for DeadlineQueue {
    fn schedule(&mut self, deadline: i64, token: TimerToken) {
        self.live.insert(token, deadline);
        self.heap.push(Reverse((deadline, token)));
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        self.live.remove(&token).is_some()
    }

    fn pop_due(&mut self, now: i64) -> Vec<TimerToken> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, token))) = self.heap.peek().copied() {
            if deadline > now {
                break;
            }
            self.heap.pop();
            if self.live.get(&token) == Some(&deadline) {
                self.live.remove(&token);
                due.push(token);
            }
        }
        due
    }

    fn next_deadline(&self) -> Option<i64> {
        self.live.values().min().copied()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}

// ---------------------------------------------------------------------------
// Extraction scheduler
// ---------------------------------------------------------------------------

/// Per-cell completion timers for one player.
#[derive(Debug, Default)]
pub struct ExtractionScheduler<Q: TimerQueue = DeadlineQueue> {
    queue: Q,
    next_token: u64,
    armed: BTreeMap<usize, TimerToken>,
    cells: BTreeMap<TimerToken, usize>,
}

impl ExtractionScheduler {
    /// Create a scheduler over a [`DeadlineQueue`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Q: TimerQueue> ExtractionScheduler<Q> {
    /// Create a scheduler over a custom timer queue.
    pub fn with_queue(queue: Q) -> Self {
        Self {
            queue,
            next_token: 0,
            armed: BTreeMap::new(),
            cells: BTreeMap::new(),
        }
    }

    /// Arm `cell` to complete at `deadline`, replacing any earlier timer.
    pub fn arm(&mut self, cell: usize, deadline: i64) {
        self.disarm(cell);
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        self.queue.schedule(deadline, token);
        self.armed.insert(cell, token);
        self.cells.insert(token, cell);
        debug!(cell, deadline, "Extraction timer armed");
    }

    /// Disarm `cell`. Returns whether a timer was live.
    pub fn disarm(&mut self, cell: usize) -> bool {
        let Some(token) = self.armed.remove(&cell) else {
            return false;
        };
        self.cells.remove(&token);
        self.queue.cancel(token)
    }

    /// Carry out timer changes returned by an economy handler.
    pub fn apply(&mut self, directives: &[TimerDirective]) {
        for directive in directives {
            match *directive {
                TimerDirective::Schedule { cell, deadline } => self.arm(cell, deadline),
                TimerDirective::Cancel { cell } => {
                    self.disarm(cell);
                }
            }
        }
    }

    /// Whether `cell` has a live timer.
    pub fn is_armed(&self, cell: usize) -> bool {
        self.armed.contains_key(&cell)
    }

    /// Number of cells with a live timer.
    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// The earliest pending completion.
    pub fn next_deadline(&self) -> Option<i64> {
        self.queue.next_deadline()
    }

    /// Fire every timer due at `now` against `ledger`, returning the
    /// completion events in deadline order.
    pub fn fire_due(&mut self, ledger: &mut PlayerLedger, now: i64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for token in self.queue.pop_due(now) {
            let Some(cell) = self.cells.remove(&token) else {
                continue;
            };
            if self.armed.get(&cell) == Some(&token) {
                self.armed.remove(&cell);
            }
            events.extend(complete_extraction(ledger, cell));
        }
        events
    }

    /// Disarm every cell.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.armed.clear();
        self.cells.clear();
    }

    /// Rebuild all timers from the ledger's stored timestamps.
    ///
    /// Cells whose end time has already passed complete immediately and
    /// their events are returned; the rest are armed for their stored end
    /// time, not restarted from `now`.
    pub fn rearm_from(&mut self, ledger: &mut PlayerLedger, now: i64) -> Vec<GameEvent> {
        self.clear();
        let pending: Vec<(usize, i64)> = ledger
            .cells()
            .iter()
            .filter(|cell| cell.is_extracting())
            .filter_map(|cell| cell.extraction_end_time.map(|end| (cell.id, end)))
            .collect();

        let mut events = Vec::new();
        for (cell, end) in pending {
            if end <= now {
                events.extend(complete_extraction(ledger, cell));
            } else {
                self.arm(cell, end);
            }
        }
        events
    }
}
