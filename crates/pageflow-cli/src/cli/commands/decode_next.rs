//! `pageflow decode-next` – show what an encoded next-chapter list decodes to.

use anyhow::{Context, Result};
use pageflow_core::config::ReaderConfig;
use pageflow_core::prefetch::decode_candidates;

pub fn run_decode_next(cfg: &ReaderConfig, encoded: &str) -> Result<()> {
    let candidates = decode_candidates(encoded, cfg.max_candidate_len)
        .context("decoding next-chapter candidate list")?;
    if candidates.is_empty() {
        println!("No usable next-chapter locations.");
    } else {
        for (i, location) in candidates.iter().enumerate() {
            println!("{:>3}  {}", i + 1, location);
        }
    }
    Ok(())
}
