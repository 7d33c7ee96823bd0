//! Look-ahead scheduler.
//!
//! Keeps network activity near the reading position: resources inside the
//! window `[active, active + look_ahead]` are queued in FIFO order and
//! drained under a concurrency cap. Entries that fall out of a shrunk window
//! are not purged; they are still drained when capacity allows. Pages
//! waiting out a retry delay are held and never queued until released.

mod budget;
mod queue;

pub use budget::SlotBudget;
pub use queue::LookAheadQueue;

use std::collections::HashSet;
use std::ops::Range;

use crate::resource::{ResourceIndex, ResourceState, ResourceTable};

/// Indices covered by the look-ahead window, clipped to the chapter.
pub fn look_ahead_window(active: usize, look_ahead: usize, len: usize) -> Range<usize> {
    let start = active.min(len);
    let end = active.saturating_add(look_ahead).saturating_add(1).min(len);
    start..end
}

/// Result of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Fetches issued.
    pub started: usize,
    /// Entries dropped because they were no longer eligible.
    pub discarded: usize,
    /// Capacity ran out with entries still queued; a later drain is needed.
    pub backlog: bool,
}

/// Queue plus concurrency cap for one chapter view.
#[derive(Debug, Clone)]
pub struct LookAheadScheduler {
    queue: LookAheadQueue,
    held: HashSet<ResourceIndex>,
    max_concurrent: usize,
    look_ahead: usize,
}

impl LookAheadScheduler {
    pub fn new(max_concurrent: usize, look_ahead: usize) -> Self {
        Self {
            queue: LookAheadQueue::new(),
            held: HashSet::new(),
            max_concurrent,
            look_ahead,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn queue(&self) -> &LookAheadQueue {
        &self.queue
    }

    /// Queue `index` iff it is idle, not held and not already queued.
    pub fn enqueue(&mut self, index: ResourceIndex, state: ResourceState) -> bool {
        if state != ResourceState::Idle || self.held.contains(&index) {
            return false;
        }
        self.queue.push(index)
    }

    /// Queue an idle `index` ahead of everything else.
    pub fn enqueue_front(&mut self, index: ResourceIndex, state: ResourceState) -> bool {
        if state != ResourceState::Idle {
            return false;
        }
        self.held.remove(&index);
        self.queue.push_front(index);
        true
    }

    /// Keep `index` out of the queue until [`release`](Self::release).
    pub fn hold(&mut self, index: ResourceIndex) {
        self.held.insert(index);
    }

    /// Lift a hold. Returns false if `index` was not held.
    pub fn release(&mut self, index: ResourceIndex) -> bool {
        self.held.remove(&index)
    }

    pub fn is_held(&self, index: ResourceIndex) -> bool {
        self.held.contains(&index)
    }

    /// Queue every idle resource inside the window around `active`.
    /// Returns how many were newly queued.
    pub fn enqueue_window(&mut self, active: usize, table: &ResourceTable) -> usize {
        let mut added = 0;
        for index in look_ahead_window(active, self.look_ahead, table.len()) {
            if let Some(state) = table.state(index) {
                if self.enqueue(index, state) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Free loading slots given `loading` resources in flight.
    pub fn capacity(&self, loading: usize) -> usize {
        self.max_concurrent.saturating_sub(loading)
    }

    /// Dequeue entries while capacity remains. `start` issues the fetch for
    /// an index and returns false when the entry is no longer eligible, in
    /// which case it is discarded without using capacity.
    pub fn drain<F>(&mut self, loading: usize, mut start: F) -> DrainOutcome
    where
        F: FnMut(ResourceIndex) -> bool,
    {
        let mut outcome = DrainOutcome::default();
        let mut capacity = self.capacity(loading);
        while capacity > 0 {
            let Some(index) = self.queue.pop() else {
                break;
            };
            if !self.held.contains(&index) && start(index) {
                outcome.started += 1;
                capacity -= 1;
            } else {
                outcome.discarded += 1;
            }
        }
        outcome.backlog = !self.queue.is_empty();
        outcome
    }
}
