//! Deduplicated FIFO of next-chapter locations.

use std::collections::{HashSet, VecDeque};

use super::decode::decode_candidates;

#[derive(Debug, Clone, Default)]
pub struct PrefetchQueue {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl PrefetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the queue from an encoded candidate list. A list that fails to
    /// decode yields an empty queue (no next-chapter prefetch).
    pub fn from_encoded(encoded: &str, max_len: usize) -> Self {
        match decode_candidates(encoded, max_len) {
            Ok(locations) => {
                let mut q = Self::new();
                for loc in locations {
                    q.push(loc);
                }
                tracing::debug!(count = q.len(), "next-chapter candidates decoded");
                q
            }
            Err(e) => {
                tracing::warn!("ignoring next-chapter candidates: {}", e);
                Self::new()
            }
        }
    }

    /// Append `location` unless it was ever queued before.
    pub fn push(&mut self, location: String) -> bool {
        if !self.seen.insert(location.clone()) {
            return false;
        }
        self.order.push_back(location);
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
