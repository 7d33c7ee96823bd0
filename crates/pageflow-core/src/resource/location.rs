//! Cache-busting rewrite of a page location for retried fetches.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Query parameter carrying the cache-busting token.
const TOKEN_PARAM: &str = "pf_retry";

/// Token derived from `(timestamp, retry_count)` so each retry requests a
/// distinct address and bypasses any cached failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBustToken {
    pub timestamp_ms: u64,
    pub retry_count: u32,
}

impl CacheBustToken {
    pub fn new(timestamp_ms: u64, retry_count: u32) -> Self {
        Self {
            timestamp_ms,
            retry_count,
        }
    }
}

/// Milliseconds since the Unix epoch, used as the token timestamp.
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl fmt::Display for CacheBustToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp_ms, self.retry_count)
    }
}

/// Rebuilds a location from `source` with `token` appended as a query
/// parameter. Any fragment stays at the end.
pub fn cache_busted(source: &str, token: CacheBustToken) -> String {
    let (base, fragment) = match source.find('#') {
        Some(pos) => source.split_at(pos),
        None => (source, ""),
    };
    let sep = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{base}{sep}{TOKEN_PARAM}={token}{fragment}")
}
