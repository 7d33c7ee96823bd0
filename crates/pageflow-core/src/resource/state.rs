//! Resource delivery state machine.

use thiserror::Error;

use super::ResourceIndex;

/// Delivery state of a single page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    /// Not requested yet, or waiting to be requested again.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Delivered. Terminal.
    Loaded,
    /// Fetch failed. Terminal unless a retry moves it back to `Idle`.
    Error,
}

impl ResourceState {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceState::Idle => "idle",
            ResourceState::Loading => "loading",
            ResourceState::Loaded => "loaded",
            ResourceState::Error => "error",
        }
    }

    /// True for the edges of the delivery state machine:
    /// idle→loading, loading→loaded, loading→error, error→idle.
    pub fn can_transition_to(self, next: ResourceState) -> bool {
        matches!(
            (self, next),
            (ResourceState::Idle, ResourceState::Loading)
                | (ResourceState::Loading, ResourceState::Loaded)
                | (ResourceState::Loading, ResourceState::Error)
                | (ResourceState::Error, ResourceState::Idle)
        )
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("resource {0} does not exist")]
    UnknownResource(ResourceIndex),
    #[error("resource {index}: illegal transition {from} -> {to}")]
    Illegal {
        index: ResourceIndex,
        from: ResourceState,
        to: ResourceState,
    },
}
