//! Reader view: the per-chapter context object.
//!
//! Owns the resource table, viewport tracker, look-ahead scheduler, retry
//! controller, completion detector and next-chapter prefetcher for one
//! chapter view, plus the timer queue that stands in for every delayed step.
//! Hosts feed it events (`start`, `on_scroll`, `on_resize`,
//! `on_fetch_result`, `on_prefetch_result`, `on_visibility_change`,
//! `poll_timers`) one at a time with the current time; nothing here blocks
//! or spawns. Dropping the view tears everything down.

mod progress;
mod surface;
mod timers;

pub use progress::DeliveryProgress;
pub use surface::{FetchOutcome, NoPrefetch, PageSurface, PrefetchClient};
pub use timers::{Timer, TimerQueue};

use std::time::Instant;

use crate::completion::{self, CompletionDetector};
use crate::config::TuningProfile;
use crate::prefetch::{ActivationGate, NextChapterPrefetcher, PrefetchQueue, PrefetchStep};
use crate::resource::{
    wall_clock_ms, Resource, ResourceDescriptor, ResourceIndex, ResourceState, ResourceTable,
};
use crate::retry::{FailurePlan, RetryController, RetryPolicy};
use crate::scheduler::LookAheadScheduler;
use crate::viewport::{FrameCoalescer, PageRect, ViewportTracker};

pub struct ReaderView<S, P> {
    profile: TuningProfile,
    table: ResourceTable,
    surfaces: Vec<S>,
    tracker: ViewportTracker,
    coalescer: FrameCoalescer,
    scheduler: LookAheadScheduler,
    retry: RetryController,
    completion: CompletionDetector,
    prefetcher: NextChapterPrefetcher,
    prefetch_client: P,
    timers: TimerQueue,
    visible: bool,
}

impl<S: PageSurface, P: PrefetchClient> ReaderView<S, P> {
    /// Build a view from page descriptors paired with their surfaces.
    ///
    /// Pages are ordered by `sequence_index`; a repeated index keeps the first
    /// page. `next_chapter` is the encoded candidate list for prefetching.
    pub fn new(
        profile: TuningProfile,
        viewport_height: f32,
        mut pages: Vec<(ResourceDescriptor, S)>,
        next_chapter: Option<&str>,
        prefetch_client: P,
    ) -> Self {
        pages.sort_by_key(|(d, _)| d.sequence_index);
        pages.dedup_by(|later, kept| {
            let dup = later.0.sequence_index == kept.0.sequence_index;
            if dup {
                tracing::warn!(
                    sequence_index = later.0.sequence_index,
                    "duplicate page descriptor dropped"
                );
            }
            dup
        });
        let (descriptors, surfaces): (Vec<_>, Vec<_>) = pages.into_iter().unzip();
        let table = ResourceTable::new(descriptors);

        let queue = next_chapter
            .map(|encoded| PrefetchQueue::from_encoded(encoded, profile.max_candidate_len))
            .unwrap_or_default();

        tracing::debug!(
            pages = table.len(),
            next_chapter = queue.len(),
            constrained = profile.constrained,
            max_concurrent = profile.max_concurrent,
            "reader view created"
        );

        Self {
            tracker: ViewportTracker::new(profile.focus_line_ratio, viewport_height),
            coalescer: FrameCoalescer::new(),
            scheduler: LookAheadScheduler::new(profile.max_concurrent, profile.look_ahead),
            retry: RetryController::new(RetryPolicy::from_profile(&profile)),
            completion: CompletionDetector::new(),
            prefetcher: NextChapterPrefetcher::new(queue, profile.next_prefetch_concurrency),
            prefetch_client,
            timers: TimerQueue::new(),
            visible: true,
            profile,
            table,
            surfaces,
        }
    }

    /// Compute the initial active page and start fetching its window.
    pub fn start(&mut self, now: Instant) {
        self.recompute_and_schedule(now);
    }

    pub fn on_scroll(&mut self, now: Instant) {
        self.request_frame(now);
    }

    pub fn on_resize(&mut self, viewport_height: f32, now: Instant) {
        self.tracker.set_viewport_height(viewport_height);
        self.request_frame(now);
    }

    /// Report the outcome of a fetch issued through `PageSurface::request_fetch`.
    ///
    /// Applies to any page still loading, attached or not, so a page detached
    /// mid-fetch settles and frees its slot.
    pub fn on_fetch_result(&mut self, index: ResourceIndex, outcome: FetchOutcome, now: Instant) {
        if self.table.state(index) != Some(ResourceState::Loading) {
            tracing::debug!(index, "stale fetch result ignored");
            return;
        }
        match outcome {
            FetchOutcome::Loaded => self.mark_loaded(index, now),
            FetchOutcome::Failed(reason) => self.handle_failure(index, &reason, now),
        }
        self.drain(now);
    }

    /// Report the outcome of a fetch issued through `PrefetchClient::prefetch`.
    pub fn on_prefetch_result(&mut self, location: &str, outcome: FetchOutcome, now: Instant) {
        if self.prefetcher.on_settled(location, outcome.is_loaded()) {
            self.timers
                .schedule_once(now + self.profile.prefetch_drain_delay, Timer::PrefetchDrain);
        } else if self.prefetcher.pending() == 0 && self.prefetcher.in_flight() == 0 {
            tracing::info!(
                issued = self.prefetcher.issued(),
                failed = self.prefetcher.failed(),
                "next-chapter prefetch complete"
            );
        }
    }

    pub fn on_visibility_change(&mut self, visible: bool, now: Instant) {
        let regained = visible && !self.visible;
        self.visible = visible;
        if regained {
            self.run_prefetch(now);
        }
    }

    /// Reader-initiated retry of a page in the terminal error state.
    ///
    /// Resets its retry count and re-attempts right away when a loading slot
    /// is free, otherwise puts it at the head of the queue. Returns false if
    /// the page is not in the error state or is detached.
    pub fn retry(&mut self, index: ResourceIndex, now: Instant) -> bool {
        if !self.is_attached(index) {
            return false;
        }
        let Some(resource) = self.table.get(index) else {
            return false;
        };
        let Some(location) = self.retry.manual(resource, wall_clock_ms()) else {
            return false;
        };
        self.table.set_retry_count(index, 0);
        self.table.set_current_location(index, location);
        if !self.set_state(index, ResourceState::Idle) {
            return false;
        }
        tracing::info!(index, "manual retry");

        let loading = self.loading_count();
        if self.scheduler.capacity(loading) > 0 {
            start_fetch(&mut self.table, &mut self.surfaces, index)
        } else {
            self.scheduler.enqueue_front(index, ResourceState::Idle);
            self.timers
                .schedule_once(now + self.profile.redrain_delay, Timer::Redrain);
            true
        }
    }

    /// Run every timer due at `now`. Returns how many fired.
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            fired += 1;
            self.fire(timer, now);
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn profile(&self) -> &TuningProfile {
        &self.profile
    }

    pub fn active_index(&self) -> usize {
        self.tracker.active_index()
    }

    pub fn resource(&self, index: ResourceIndex) -> Option<&Resource> {
        self.table.get(index)
    }

    pub fn state(&self, index: ResourceIndex) -> Option<ResourceState> {
        self.table.state(index)
    }

    pub fn surface(&self, index: ResourceIndex) -> Option<&S> {
        self.surfaces.get(index)
    }

    pub fn surface_mut(&mut self, index: ResourceIndex) -> Option<&mut S> {
        self.surfaces.get_mut(index)
    }

    pub fn prefetch_client(&self) -> &P {
        &self.prefetch_client
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_chapter_ready(&self) -> bool {
        completion::is_chapter_ready(&self.table)
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.completion.is_fully_delivered()
    }

    pub fn queued(&self) -> impl Iterator<Item = ResourceIndex> + '_ {
        self.scheduler.queue().iter()
    }

    /// Pages currently loading, attached or not.
    pub fn loading_count(&self) -> usize {
        self.table.count_in_state(ResourceState::Loading)
    }

    /// True while `index` is waiting out a retry delay.
    pub fn is_retry_pending(&self, index: ResourceIndex) -> bool {
        self.scheduler.is_held(index)
    }

    /// Nothing loading, no prefetch in flight and no deferred work pending.
    pub fn is_settled(&self) -> bool {
        self.timers.is_empty() && self.loading_count() == 0 && self.prefetcher.in_flight() == 0
    }

    pub fn progress(&self) -> DeliveryProgress {
        DeliveryProgress {
            total: self.table.len(),
            loaded: self.table.count_in_state(ResourceState::Loaded),
            loading: self.loading_count(),
            failed: self.table.count_in_state(ResourceState::Error),
            queued: self.scheduler.queue().len(),
            active_index: self.tracker.active_index(),
            fully_delivered: self.completion.is_fully_delivered(),
            prefetch_pending: self.prefetcher.pending(),
            prefetch_in_flight: self.prefetcher.in_flight(),
        }
    }

    /// Tear the view down (navigation away). In-flight fetches are not
    /// aborted; their results simply have nowhere to go.
    pub fn teardown(self) {
        tracing::debug!(
            pages = self.table.len(),
            loaded = self.table.count_in_state(ResourceState::Loaded),
            pending_timers = self.timers.len(),
            "reader view torn down"
        );
    }

    fn is_attached(&self, index: ResourceIndex) -> bool {
        self.surfaces
            .get(index)
            .map(|s| s.is_attached())
            .unwrap_or(false)
    }

    fn request_frame(&mut self, now: Instant) {
        if self.coalescer.request() {
            self.timers
                .schedule(now + self.profile.frame_interval, Timer::Frame);
        }
    }

    fn recompute_and_schedule(&mut self, now: Instant) {
        let positions: Vec<Option<PageRect>> = self
            .surfaces
            .iter()
            .map(|s| if s.is_attached() { s.visible_position() } else { None })
            .collect();
        let active = self.tracker.recompute(&positions);
        let added = self.scheduler.enqueue_window(active, &self.table);
        if added > 0 {
            tracing::debug!(active, added, "look-ahead window queued");
        }
        self.drain(now);
    }

    fn drain(&mut self, now: Instant) {
        let loading = self.loading_count();
        let table = &mut self.table;
        let surfaces = &mut self.surfaces;
        let outcome = self
            .scheduler
            .drain(loading, |index| start_fetch(table, surfaces, index));
        if outcome.discarded > 0 {
            tracing::debug!(discarded = outcome.discarded, "stale queue entries skipped");
        }
        if outcome.backlog {
            self.timers
                .schedule_once(now + self.profile.redrain_delay, Timer::Redrain);
        }
    }

    /// The one place a view changes a page's state after dequeue; the
    /// surface is told about every successful transition.
    fn set_state(&mut self, index: ResourceIndex, next: ResourceState) -> bool {
        match self.table.transition(index, next) {
            Ok(_) => {
                if let Some(surface) = self.surfaces.get_mut(index) {
                    surface.reflect_state(next);
                }
                true
            }
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        }
    }

    fn mark_loaded(&mut self, index: ResourceIndex, now: Instant) {
        if !self.set_state(index, ResourceState::Loaded) {
            return;
        }
        tracing::debug!(index, "page loaded");
        if self.completion.record_loaded(&self.table) {
            tracing::info!(pages = self.table.len(), "chapter fully delivered");
            if self.prefetcher.trigger() {
                self.run_prefetch(now);
            }
        }
    }

    fn handle_failure(&mut self, index: ResourceIndex, reason: &str, now: Instant) {
        if !self.set_state(index, ResourceState::Error) {
            return;
        }
        let Some(resource) = self.table.get(index) else {
            return;
        };
        let used = resource.retry_count();
        match self.retry.on_failure(resource, wall_clock_ms()) {
            FailurePlan::Terminal => {
                tracing::warn!(index, retries = used, %reason, "page failed; retries exhausted");
            }
            FailurePlan::Retry {
                retry_count,
                location,
                delay,
            } => {
                tracing::debug!(index, retry_count, ?delay, %reason, "page failed; retry scheduled");
                self.table.set_retry_count(index, retry_count);
                self.table.set_current_location(index, location);
                self.set_state(index, ResourceState::Idle);
                self.scheduler.hold(index);
                self.timers.reschedule(now + delay, Timer::Retry(index));
            }
        }
    }

    fn fire(&mut self, timer: Timer, now: Instant) {
        match timer {
            Timer::Frame => {
                if self.coalescer.on_frame() {
                    self.recompute_and_schedule(now);
                }
            }
            Timer::Redrain => self.drain(now),
            Timer::Retry(index) => {
                self.scheduler.release(index);
                if let Some(state) = self.table.state(index) {
                    self.scheduler.enqueue(index, state);
                }
                self.drain(now);
            }
            Timer::PrefetchDrain | Timer::PrefetchRecheck => self.run_prefetch(now),
        }
    }

    fn run_prefetch(&mut self, now: Instant) {
        if !self.prefetcher.is_triggered() {
            return;
        }
        let gate = ActivationGate {
            fully_delivered: self.completion.is_fully_delivered(),
            network_idle: self.loading_count() == 0,
            visible: self.visible,
        };
        let client = &mut self.prefetch_client;
        match self.prefetcher.drain(gate, |location| client.prefetch(location)) {
            PrefetchStep::Blocked => {
                self.timers.schedule_once(
                    now + self.profile.prefetch_recheck_delay,
                    Timer::PrefetchRecheck,
                );
            }
            PrefetchStep::Started(n) => tracing::debug!(started = n, "next-chapter prefetch drain"),
            PrefetchStep::Disabled => tracing::debug!("next-chapter prefetch disabled"),
            PrefetchStep::Waiting | PrefetchStep::Finished => {}
        }
    }
}

/// Dequeue-time start of a fetch: skip pages that are detached or no longer
/// idle, otherwise mark loading and hand the location to the surface.
fn start_fetch<S: PageSurface>(
    table: &mut ResourceTable,
    surfaces: &mut [S],
    index: ResourceIndex,
) -> bool {
    let Some(surface) = surfaces.get_mut(index) else {
        return false;
    };
    if !surface.is_attached() || table.state(index) != Some(ResourceState::Idle) {
        return false;
    }
    let (current, source) = match table.get(index) {
        Some(r) => (
            r.current_location().to_string(),
            r.source_location().to_string(),
        ),
        None => return false,
    };
    if let Err(e) = table.transition(index, ResourceState::Loading) {
        tracing::warn!("{}", e);
        return false;
    }
    let location = if current.is_empty() {
        table.set_current_location(index, source.clone());
        source
    } else {
        current
    };
    surface.reflect_state(ResourceState::Loading);
    surface.request_fetch(&location);
    tracing::debug!(index, %location, "fetch issued");
    true
}
