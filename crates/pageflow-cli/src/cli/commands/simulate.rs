//! `pageflow simulate` – read a chapter against a simulated network.

use anyhow::Result;
use pageflow_core::config::{ReaderConfig, TuningProfile};
use pageflow_core::manifest::ChapterManifest;
use std::path::PathBuf;
use std::time::Duration;

use crate::host::{self, HostOptions, Transport, VIEWPORT_HEIGHT};

use super::print_report;

#[derive(Debug)]
pub struct SimulateArgs {
    pub manifest: PathBuf,
    pub constrained: bool,
    pub latency_ms: u64,
    pub fail_every: usize,
    pub scroll_interval_ms: u64,
}

pub async fn run_simulate(cfg: &ReaderConfig, args: SimulateArgs) -> Result<()> {
    let manifest = ChapterManifest::load(&args.manifest)?;
    let profile = TuningProfile::select(cfg, args.constrained);
    let opts = HostOptions {
        scroll_interval: Duration::from_millis(args.scroll_interval_ms),
        out_dir: None,
        viewport_height: VIEWPORT_HEIGHT,
    };
    let transport = Transport::simulated(Duration::from_millis(args.latency_ms), args.fail_every);
    let report = host::drive(&manifest, profile, transport, &opts).await?;
    print_report(&report);
    Ok(())
}
