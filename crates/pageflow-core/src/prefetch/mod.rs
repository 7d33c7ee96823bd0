//! Next-chapter prefetcher.
//!
//! Once the current chapter is fully delivered, the network is quiet and the
//! page is visible, the next chapter's locations are fetched out of band
//! under a small budget of their own. Failures are dropped; there is no
//! retry.

mod decode;
mod queue;

pub use decode::{decode_candidates, is_acceptable_location, DecodeError};
pub use queue::PrefetchQueue;

use std::collections::HashSet;

use crate::scheduler::SlotBudget;

/// Conditions that must all hold before prefetching may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationGate {
    pub fully_delivered: bool,
    /// No page of the current chapter is loading.
    pub network_idle: bool,
    /// The page is foreground-visible.
    pub visible: bool,
}

impl ActivationGate {
    pub fn is_open(&self) -> bool {
        self.fully_delivered && self.network_idle && self.visible
    }
}

/// Result of one prefetch drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchStep {
    /// Budget is zero; prefetching never runs.
    Disabled,
    /// Activation conditions not met; re-check later.
    Blocked,
    /// Issued this many fetches.
    Started(usize),
    /// Nothing issued; waiting for in-flight fetches to settle.
    Waiting,
    /// Queue empty and nothing in flight.
    Finished,
}

#[derive(Debug, Clone)]
pub struct NextChapterPrefetcher {
    queue: PrefetchQueue,
    budget: SlotBudget,
    in_flight: HashSet<String>,
    triggered: bool,
    issued: usize,
    failed: usize,
}

impl NextChapterPrefetcher {
    pub fn new(queue: PrefetchQueue, concurrency: usize) -> Self {
        Self {
            queue,
            budget: SlotBudget::new(concurrency),
            in_flight: HashSet::new(),
            triggered: false,
            issued: 0,
            failed: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.budget.max_total() > 0
    }

    /// Arm the prefetcher. Returns true only on the first call.
    pub fn trigger(&mut self) -> bool {
        !std::mem::replace(&mut self.triggered, true)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Issue fetches through `issue` while budget remains and the gate is open.
    pub fn drain<F>(&mut self, gate: ActivationGate, mut issue: F) -> PrefetchStep
    where
        F: FnMut(&str),
    {
        if !self.is_enabled() {
            return PrefetchStep::Disabled;
        }
        if !gate.is_open() {
            return PrefetchStep::Blocked;
        }
        if self.queue.is_empty() {
            return if self.in_flight.is_empty() {
                PrefetchStep::Finished
            } else {
                PrefetchStep::Waiting
            };
        }

        let mut started = 0;
        while self.budget.available() > 0 {
            let Some(location) = self.queue.pop() else {
                break;
            };
            self.budget.reserve(1);
            issue(&location);
            tracing::debug!(%location, "next-chapter prefetch issued");
            self.in_flight.insert(location);
            self.issued += 1;
            started += 1;
        }
        if started > 0 {
            PrefetchStep::Started(started)
        } else {
            PrefetchStep::Waiting
        }
    }

    /// Free the slot of a settled fetch. Returns true when more locations
    /// are queued and a follow-up drain should be scheduled.
    pub fn on_settled(&mut self, location: &str, ok: bool) -> bool {
        if !self.in_flight.remove(location) {
            return false;
        }
        self.budget.release(1);
        if !ok {
            self.failed += 1;
            tracing::debug!(%location, "next-chapter prefetch failed; dropped");
        }
        !self.queue.is_empty()
    }
}
