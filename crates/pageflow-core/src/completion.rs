//! Chapter completion detection.
//!
//! Readiness is read straight off the resource table; the detector only
//! latches the "fully delivered" flag so the next-chapter trigger fires
//! exactly once per chapter.

use crate::resource::{ResourceState, ResourceTable};

/// True iff the chapter has pages and every one of them is loaded.
/// An empty chapter is never ready.
pub fn is_chapter_ready(table: &ResourceTable) -> bool {
    table.all_in_state(ResourceState::Loaded)
}

#[derive(Debug, Clone, Default)]
pub struct CompletionDetector {
    fully_delivered: bool,
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.fully_delivered
    }

    /// Re-evaluate readiness after a `loaded` transition.
    ///
    /// Returns true only on the call that first finds the chapter ready; the
    /// caller fires the next-chapter trigger on that value alone.
    pub fn record_loaded(&mut self, table: &ResourceTable) -> bool {
        if self.fully_delivered || !is_chapter_ready(table) {
            return false;
        }
        self.fully_delivered = true;
        true
    }
}
