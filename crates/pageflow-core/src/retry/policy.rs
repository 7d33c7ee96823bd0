use std::time::Duration;

use crate::config::TuningProfile;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Ceiling reached; leave the page in the error state.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Linear backoff with a retry ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Automatic retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay unit; the n-th retry waits `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_profile(&TuningProfile::default())
    }
}

impl RetryPolicy {
    pub fn from_profile(profile: &TuningProfile) -> Self {
        Self {
            max_retries: profile.max_retries,
            base_delay: profile.retry_base_delay,
        }
    }

    /// Decide what to do after a failure of a page that has already used
    /// `retry_count` retries.
    pub fn decide(&self, retry_count: u32) -> RetryDecision {
        if retry_count >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        let next = retry_count.saturating_add(1);
        RetryDecision::RetryAfter(self.base_delay.saturating_mul(next))
    }
}
