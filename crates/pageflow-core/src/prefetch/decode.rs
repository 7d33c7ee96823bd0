//! Decoding of the encoded next-chapter candidate list.
//!
//! The list arrives as a JSON array of location strings. Entries that are
//! not strings, are empty, exceed the length limit, or are neither absolute
//! `http(s)` URLs nor site-relative paths are dropped; the rest are
//! deduplicated in order.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("candidate list is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// True for `http(s)://host/...` URLs and `/path` site-relative locations.
pub fn is_acceptable_location(location: &str) -> bool {
    if location.starts_with('/') {
        return !location.starts_with("//");
    }
    match url::Url::parse(location) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

/// Decode `encoded` into the ordered, deduplicated list of usable locations.
/// A blank input decodes to an empty list.
pub fn decode_candidates(encoded: &str, max_len: usize) -> Result<Vec<String>, DecodeError> {
    let trimmed = encoded.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in raw {
        let Some(s) = value.as_str() else { continue };
        let s = s.trim();
        if s.is_empty() || s.len() > max_len || !is_acceptable_location(s) {
            continue;
        }
        if seen.insert(s.to_string()) {
            out.push(s.to_string());
        }
    }
    Ok(out)
}
