//! Deferred work for a reader view.
//!
//! Every suspension point of the engine (frame coalescing, re-drain, retry
//! delay, prefetch pacing) is a timer here. Hosts poll with the current time
//! and sleep until `next_deadline`.

use std::time::Instant;

use crate::resource::ResourceIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Recompute the active page for coalesced scroll/resize events.
    Frame,
    /// Drain the look-ahead queue again after it hit the concurrency cap.
    Redrain,
    /// Re-enqueue a page after its retry delay.
    Retry(ResourceIndex),
    /// Drain the prefetch queue after a prefetch settled.
    PrefetchDrain,
    /// Re-check prefetch activation conditions.
    PrefetchRecheck,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: Vec<(Instant, u64, Timer)>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Instant, timer: Timer) {
        self.seq += 1;
        self.entries.push((at, self.seq, timer));
    }

    /// Schedule `timer` unless an identical one is already pending.
    pub fn schedule_once(&mut self, at: Instant, timer: Timer) -> bool {
        if self.contains(timer) {
            return false;
        }
        self.schedule(at, timer);
        true
    }

    /// Schedule `timer` at `at`, dropping any identical timer still pending.
    pub fn reschedule(&mut self, at: Instant, timer: Timer) {
        self.cancel(timer);
        self.schedule(at, timer);
    }

    /// Remove every pending `timer`. Returns how many were removed.
    pub fn cancel(&mut self, timer: Timer) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, _, t)| *t != timer);
        before - self.entries.len()
    }

    pub fn contains(&self, timer: Timer) -> bool {
        self.entries.iter().any(|(_, _, t)| *t == timer)
    }

    /// Remove and return the earliest timer due at `now` (ties in schedule order).
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (at, ..))| *at <= now)
            .min_by_key(|(_, (at, seq, _))| (*at, *seq))
            .map(|(i, _)| i)?;
        Some(self.entries.remove(pos).2)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|(at, ..)| *at).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pops_in_deadline_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + Duration::from_millis(200), Timer::Redrain);
        q.schedule(t0 + Duration::from_millis(100), Timer::Retry(2));
        q.schedule(t0 + Duration::from_millis(100), Timer::Frame);
        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_millis(100)));
        assert_eq!(q.pop_due(t0), None);
        let later = t0 + Duration::from_millis(250);
        assert_eq!(q.pop_due(later), Some(Timer::Retry(2)));
        assert_eq!(q.pop_due(later), Some(Timer::Frame));
        assert_eq!(q.pop_due(later), Some(Timer::Redrain));
        assert!(q.is_empty());
    }

    #[test]
    fn schedule_once_dedups() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        assert!(q.schedule_once(t0, Timer::PrefetchRecheck));
        assert!(!q.schedule_once(t0 + Duration::from_secs(1), Timer::PrefetchRecheck));
        assert!(q.schedule_once(t0, Timer::Retry(1)));
        assert!(q.schedule_once(t0, Timer::Retry(2)));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn reschedule_replaces_pending_deadline() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + Duration::from_millis(1100), Timer::Retry(2));
        q.schedule(t0 + Duration::from_millis(1100), Timer::Retry(3));
        q.reschedule(t0 + Duration::from_millis(2200), Timer::Retry(2));
        assert_eq!(q.len(), 2);
        let mid = t0 + Duration::from_millis(1500);
        assert_eq!(q.pop_due(mid), Some(Timer::Retry(3)));
        assert_eq!(q.pop_due(mid), None);
        assert_eq!(q.pop_due(t0 + Duration::from_millis(2200)), Some(Timer::Retry(2)));
        assert_eq!(q.cancel(Timer::Retry(2)), 0);
    }
}
