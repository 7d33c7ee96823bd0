//! Retry policy for failed page fetches.
//!
//! Failed pages are retried a bounded number of times with a linearly
//! growing delay and a fresh cache-busting location, so transient failures
//! recover without the reader noticing. Once the ceiling is reached the page
//! stays in the error state until the reader retries it by hand.

mod controller;
mod policy;

pub use controller::{FailurePlan, RetryController};
pub use policy::{RetryDecision, RetryPolicy};
