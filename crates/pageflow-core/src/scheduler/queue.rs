//! Deduplicated FIFO of resource indices awaiting a fetch attempt.

use std::collections::{HashSet, VecDeque};

use crate::resource::ResourceIndex;

#[derive(Debug, Clone, Default)]
pub struct LookAheadQueue {
    order: VecDeque<ResourceIndex>,
    members: HashSet<ResourceIndex>,
}

impl LookAheadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `index` unless it is already queued.
    pub fn push(&mut self, index: ResourceIndex) -> bool {
        if !self.members.insert(index) {
            return false;
        }
        self.order.push_back(index);
        true
    }

    /// Put `index` at the head of the queue, moving it there if it is
    /// already queued.
    pub fn push_front(&mut self, index: ResourceIndex) {
        if !self.members.insert(index) {
            self.order.retain(|&queued| queued != index);
        }
        self.order.push_front(index);
    }

    pub fn pop(&mut self) -> Option<ResourceIndex> {
        let index = self.order.pop_front()?;
        self.members.remove(&index);
        Some(index)
    }

    pub fn contains(&self, index: ResourceIndex) -> bool {
        self.members.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResourceIndex> + '_ {
        self.order.iter().copied()
    }
}
