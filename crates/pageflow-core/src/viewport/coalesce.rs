//! Frame coalescing for scroll/resize driven recomputation.

/// Collapses any number of scroll/resize notifications into at most one
/// recomputation per rendering frame.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    dirty: bool,
    frame_scheduled: bool,
    coalesced: u64,
}

impl FrameCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that positions changed. Returns true when the caller must
    /// schedule a frame; false when one is already pending.
    pub fn request(&mut self) -> bool {
        self.dirty = true;
        if self.frame_scheduled {
            self.coalesced += 1;
            return false;
        }
        self.frame_scheduled = true;
        true
    }

    /// Called when the scheduled frame runs. Returns true if a recomputation
    /// is due.
    pub fn on_frame(&mut self) -> bool {
        self.frame_scheduled = false;
        std::mem::take(&mut self.dirty)
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_scheduled
    }

    /// Notifications absorbed into an already pending frame.
    pub fn coalesced_events(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_requests_one_frame() {
        let mut c = FrameCoalescer::new();
        assert!(c.request());
        assert!(!c.request());
        assert!(!c.request());
        assert_eq!(c.coalesced_events(), 2);
        assert!(c.frame_pending());
        assert!(c.on_frame());
        assert!(!c.frame_pending());
    }

    #[test]
    fn frame_without_request_does_nothing() {
        let mut c = FrameCoalescer::new();
        assert!(!c.on_frame());
        assert!(c.request());
        assert!(c.on_frame());
        assert!(!c.on_frame());
    }
}
