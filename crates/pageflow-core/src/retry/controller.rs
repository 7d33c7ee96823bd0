//! Turns a fetch failure into a plan for the owning view to apply.

use std::time::Duration;

use crate::resource::{cache_busted, CacheBustToken, Resource, ResourceState};

use super::policy::{RetryDecision, RetryPolicy};

/// What should happen to a page whose fetch just failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePlan {
    /// Retries exhausted: stay in the error state.
    Terminal,
    /// Go back to idle with a fresh location and re-enqueue after `delay`.
    Retry {
        retry_count: u32,
        location: String,
        delay: Duration,
    },
}

/// Retry decisions for pages of one view.
#[derive(Debug, Clone, Copy)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Plan the follow-up for a failed fetch of `resource`.
    pub fn on_failure(&self, resource: &Resource, timestamp_ms: u64) -> FailurePlan {
        match self.policy.decide(resource.retry_count()) {
            RetryDecision::NoRetry => FailurePlan::Terminal,
            RetryDecision::RetryAfter(delay) => {
                let retry_count = resource.retry_count() + 1;
                let token = CacheBustToken::new(timestamp_ms, retry_count);
                FailurePlan::Retry {
                    retry_count,
                    location: cache_busted(resource.source_location(), token),
                    delay,
                }
            }
        }
    }

    /// Location for a reader-initiated retry of a page in the terminal error
    /// state; `None` if the page is not in that state. The retry count is
    /// reset to 0 by the caller.
    pub fn manual(&self, resource: &Resource, timestamp_ms: u64) -> Option<String> {
        if resource.state() != ResourceState::Error {
            return None;
        }
        let token = CacheBustToken::new(timestamp_ms, 0);
        Some(cache_busted(resource.source_location(), token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceDescriptor;

    fn resource(retry_count: u32, state: ResourceState) -> Resource {
        let mut r = Resource::new(ResourceDescriptor::new(2, "/c/p2.jpg"));
        r.retry_count = retry_count;
        r.state = state;
        r
    }

    #[test]
    fn first_failure_schedules_retry() {
        let c = RetryController::new(RetryPolicy::default());
        let plan = c.on_failure(&resource(0, ResourceState::Error), 42);
        assert_eq!(
            plan,
            FailurePlan::Retry {
                retry_count: 1,
                location: "/c/p2.jpg?pf_retry=42-1".to_string(),
                delay: Duration::from_millis(1100),
            }
        );
    }

    #[test]
    fn exhausted_failure_is_terminal() {
        let c = RetryController::new(RetryPolicy::default());
        assert_eq!(
            c.on_failure(&resource(2, ResourceState::Error), 42),
            FailurePlan::Terminal
        );
    }

    #[test]
    fn manual_only_from_error() {
        let c = RetryController::new(RetryPolicy::default());
        assert!(c.manual(&resource(2, ResourceState::Loaded), 1).is_none());
        assert_eq!(
            c.manual(&resource(2, ResourceState::Error), 7).as_deref(),
            Some("/c/p2.jpg?pf_retry=7-0")
        );
    }
}
