//! Slot budget for out-of-band fetches.
//!
//! The next-chapter prefetcher reserves a slot per in-flight fetch and
//! releases it when the fetch settles, so its traffic stays under its own
//! small cap. A budget of 0 disables the holder entirely.

/// Counts reserved slots against a fixed maximum.
#[derive(Debug, Clone)]
pub struct SlotBudget {
    max_total: usize,
    in_use: usize,
}

impl SlotBudget {
    pub fn new(max_total: usize) -> Self {
        Self {
            max_total,
            in_use: 0,
        }
    }

    pub fn max_total(&self) -> usize {
        self.max_total
    }

    /// Available slots (max_total - in_use).
    pub fn available(&self) -> usize {
        self.max_total.saturating_sub(self.in_use)
    }

    /// Reserve up to `requested` slots. Returns the number actually reserved.
    pub fn reserve(&mut self, requested: usize) -> usize {
        let take = requested.min(self.available());
        self.in_use += take;
        take
    }

    /// Release `n` slots back to the budget.
    pub fn release(&mut self, n: usize) {
        self.in_use = self.in_use.saturating_sub(n);
    }
}
