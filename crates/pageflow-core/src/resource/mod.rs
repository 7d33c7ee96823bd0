//! Per-page delivery records for one chapter view.
//!
//! A [`Resource`] tracks one page image: where it comes from, where it is
//! currently requested from (possibly with a cache-busting token), its
//! delivery state and how many automatic retries it has used. The
//! [`ResourceTable`] owns all resources of a chapter and is the only place
//! their state changes.

mod location;
mod state;
mod table;

pub use location::{cache_busted, wall_clock_ms, CacheBustToken};
pub use state::{ResourceState, TransitionError};
pub use table::ResourceTable;

/// Index of a resource inside its chapter (position in reading order).
pub type ResourceIndex = usize;

/// What the surrounding page supplies for each page image at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub sequence_index: usize,
    pub source_location: String,
}

impl ResourceDescriptor {
    pub fn new(sequence_index: usize, source_location: impl Into<String>) -> Self {
        Self {
            sequence_index,
            source_location: source_location.into(),
        }
    }
}

/// One page image and its delivery state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub(crate) sequence_index: usize,
    pub(crate) source_location: String,
    pub(crate) current_location: String,
    pub(crate) state: ResourceState,
    pub(crate) retry_count: u32,
}

impl Resource {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            sequence_index: descriptor.sequence_index,
            current_location: descriptor.source_location.clone(),
            source_location: descriptor.source_location,
            state: ResourceState::Idle,
            retry_count: 0,
        }
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    pub fn current_location(&self) -> &str {
        &self.current_location
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }
}
