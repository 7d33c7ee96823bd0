//! Delivery progress snapshot for one chapter view.

/// Point-in-time view of chapter delivery (CLI/UI friendly).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryProgress {
    pub total: usize,
    pub loaded: usize,
    pub loading: usize,
    /// Pages in the terminal error state.
    pub failed: usize,
    pub queued: usize,
    pub active_index: usize,
    pub fully_delivered: bool,
    pub prefetch_pending: usize,
    pub prefetch_in_flight: usize,
}

impl DeliveryProgress {
    /// Fraction of pages loaded in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.loaded as f64 / self.total as f64).min(1.0)
    }

    /// Every page has reached a final state (loaded or terminal error).
    pub fn is_resolved(&self) -> bool {
        self.loaded + self.failed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(total: usize, loaded: usize, failed: usize) -> DeliveryProgress {
        DeliveryProgress {
            total,
            loaded,
            loading: 0,
            failed,
            queued: 0,
            active_index: 0,
            fully_delivered: false,
            prefetch_pending: 0,
            prefetch_in_flight: 0,
        }
    }

    #[test]
    fn fraction_and_resolution() {
        assert_eq!(progress(0, 0, 0).fraction(), 0.0);
        assert!((progress(4, 1, 0).fraction() - 0.25).abs() < 1e-9);
        assert!(!progress(4, 2, 1).is_resolved());
        assert!(progress(4, 3, 1).is_resolved());
    }
}
