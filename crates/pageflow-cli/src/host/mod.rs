//! Headless reader host: owns one `ReaderView`, scrolls it at a fixed pace
//! and feeds it fetch outcomes and timer ticks until the chapter settles.

mod page;
mod transport;

pub use page::{HeadlessPage, HeadlessPrefetch};
pub use transport::{Fetched, Target, Transport};

use anyhow::{Context, Result};
use pageflow_core::config::TuningProfile;
use pageflow_core::manifest::{output_name, ChapterManifest};
use pageflow_core::view::{DeliveryProgress, FetchOutcome, ReaderView};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Viewport height of the headless reader.
pub const VIEWPORT_HEIGHT: f32 = 900.0;

#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Time between scroll steps.
    pub scroll_interval: Duration,
    /// Directory delivered pages are written to, if any.
    pub out_dir: Option<PathBuf>,
    pub viewport_height: f32,
}

/// Final state of a hosted chapter view.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub progress: DeliveryProgress,
    pub elapsed: Duration,
    pub page_fetches: usize,
    pub prefetch_issued: usize,
    pub prefetch_failed: usize,
}

type HostView = ReaderView<HeadlessPage, HeadlessPrefetch>;

/// Drive a reader view over `manifest` to completion.
///
/// Scrolls one step per `scroll_interval` (a viewport or a page, whichever
/// is shorter) until the end of the chapter, then keeps going until nothing
/// is loading, no prefetch is in flight and no timer is pending.
pub async fn drive(
    manifest: &ChapterManifest,
    profile: TuningProfile,
    transport: Transport,
    opts: &HostOptions,
) -> Result<DeliveryReport> {
    if let Some(dir) = &opts.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Fetched>();
    let scroll_y = Rc::new(Cell::new(0.0f32));
    let page_height = manifest.page_height();
    let pages = manifest
        .descriptors()
        .into_iter()
        .map(|d| {
            let page = HeadlessPage::new(
                d.sequence_index,
                page_height,
                Rc::clone(&scroll_y),
                transport.clone(),
                tx.clone(),
            );
            (d, page)
        })
        .collect();
    let prefetch = HeadlessPrefetch::new(transport, tx);
    let mut view: HostView = ReaderView::new(
        profile,
        opts.viewport_height,
        pages,
        manifest.next_chapter.as_deref(),
        prefetch,
    );

    let total_height = view.len() as f32 * page_height;
    let max_scroll = (total_height - opts.viewport_height).max(0.0);
    let step = opts.viewport_height.min(page_height).max(1.0);

    let started = Instant::now();
    view.start(started);
    tracing::info!(
        pages = view.len(),
        constrained = profile.constrained,
        "reading chapter"
    );

    let mut ticker = tokio::time::interval(opts.scroll_interval.max(Duration::from_millis(1)));
    ticker.tick().await;

    let mut page_fetches = 0usize;
    let mut prefetch_failed = 0usize;

    loop {
        if scroll_y.get() >= max_scroll && view.is_settled() {
            break;
        }
        let wake = view
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            Some(fetched) = rx.recv() => {
                let now = Instant::now();
                match fetched.target {
                    Target::Page(index) => {
                        page_fetches += 1;
                        let outcome = deliver_page(index, &fetched, opts)?;
                        view.on_fetch_result(index, outcome, now);
                        print_progress(&view.progress());
                    }
                    Target::Prefetch => {
                        let outcome = match &fetched.result {
                            Ok(bytes) => {
                                tracing::debug!(location = %fetched.location, bytes = bytes.len(), "next-chapter page warmed");
                                FetchOutcome::Loaded
                            }
                            Err(reason) => {
                                prefetch_failed += 1;
                                FetchOutcome::Failed(reason.clone())
                            }
                        };
                        view.on_prefetch_result(&fetched.location, outcome, now);
                    }
                }
            }
            _ = ticker.tick(), if scroll_y.get() < max_scroll => {
                scroll_y.set((scroll_y.get() + step).min(max_scroll));
                view.on_scroll(Instant::now());
            }
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(wake)) => {
                view.poll_timers(Instant::now());
            }
        }
    }

    let report = DeliveryReport {
        progress: view.progress(),
        elapsed: started.elapsed(),
        page_fetches,
        prefetch_issued: view.prefetch_client().issued(),
        prefetch_failed,
    };
    view.teardown();
    Ok(report)
}

/// Turn a settled page fetch into an outcome, writing the bytes out first
/// when an output directory is set.
fn deliver_page(index: usize, fetched: &Fetched, opts: &HostOptions) -> Result<FetchOutcome> {
    match &fetched.result {
        Ok(bytes) => {
            if let Some(dir) = &opts.out_dir {
                let path = dir.join(output_name(index, &fetched.location));
                fs::write(&path, bytes)
                    .with_context(|| format!("writing page to {}", path.display()))?;
            }
            Ok(FetchOutcome::Loaded)
        }
        Err(reason) => {
            tracing::debug!(index, location = %fetched.location, %reason, "page fetch failed");
            Ok(FetchOutcome::Failed(reason.clone()))
        }
    }
}

fn print_progress(p: &DeliveryProgress) {
    println!(
        "  page {:>3}/{}  loaded {}  loading {}  failed {}  ({:.0}%)",
        p.active_index + 1,
        p.total,
        p.loaded,
        p.loading,
        p.failed,
        p.fraction() * 100.0
    );
}
