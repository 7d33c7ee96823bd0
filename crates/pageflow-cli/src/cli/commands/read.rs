//! `pageflow read` – read a chapter over HTTP.

use anyhow::Result;
use pageflow_core::config::{ReaderConfig, TuningProfile};
use pageflow_core::manifest::ChapterManifest;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::host::{self, HostOptions, Transport, VIEWPORT_HEIGHT};

use super::print_report;

/// Total time allowed for one page fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ReadArgs {
    pub manifest: PathBuf,
    pub constrained: bool,
    pub scroll_interval_ms: u64,
    pub out: Option<PathBuf>,
}

pub async fn run_read(cfg: &ReaderConfig, args: ReadArgs) -> Result<()> {
    let manifest = Arc::new(ChapterManifest::load(&args.manifest)?);
    if manifest.base_url.is_none() && manifest.pages.iter().any(|p| p.starts_with('/')) {
        tracing::warn!("manifest has site-relative pages but no base_url; they will fail");
    }
    let profile = TuningProfile::select(cfg, args.constrained);
    let opts = HostOptions {
        scroll_interval: Duration::from_millis(args.scroll_interval_ms),
        out_dir: args.out,
        viewport_height: VIEWPORT_HEIGHT,
    };
    let transport = Transport::http(Arc::clone(&manifest), FETCH_TIMEOUT);
    let report = host::drive(&manifest, profile, transport, &opts).await?;
    print_report(&report);
    Ok(())
}
