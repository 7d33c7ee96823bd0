//! Shared harness for reader-view scenario tests.
//!
//! Pages are laid out as a vertical strip of equal-height boxes; scrolling
//! moves every box up. The harness owns the clock and steps it from one
//! timer deadline to the next.
#![allow(dead_code)]

pub mod page_server;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pageflow_core::config::TuningProfile;
use pageflow_core::resource::{ResourceDescriptor, ResourceState};
use pageflow_core::view::{FetchOutcome, PageSurface, PrefetchClient, ReaderView};
use pageflow_core::viewport::PageRect;

pub const PAGE_HEIGHT: f32 = 1000.0;
pub const VIEWPORT_HEIGHT: f32 = 1000.0;

/// Every fetch request in issue order: (page index, location).
pub type NetLog = Rc<RefCell<Vec<(usize, String)>>>;

pub struct MockPage {
    pub index: usize,
    pub rect: Option<PageRect>,
    pub attached: bool,
    pub requested: Vec<String>,
    pub states: Vec<ResourceState>,
    net: NetLog,
}

impl PageSurface for MockPage {
    fn visible_position(&self) -> Option<PageRect> {
        self.rect
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn request_fetch(&mut self, location: &str) {
        self.requested.push(location.to_string());
        self.net.borrow_mut().push((self.index, location.to_string()));
    }

    fn reflect_state(&mut self, state: ResourceState) {
        self.states.push(state);
    }
}

#[derive(Clone, Default)]
pub struct MockPrefetch {
    pub issued: Rc<RefCell<Vec<String>>>,
}

impl PrefetchClient for MockPrefetch {
    fn prefetch(&mut self, location: &str) {
        self.issued.borrow_mut().push(location.to_string());
    }
}

pub struct Harness {
    pub view: ReaderView<MockPage, MockPrefetch>,
    pub now: Instant,
    pub net: NetLog,
    pub prefetched: Rc<RefCell<Vec<String>>>,
    pub scroll_y: f32,
}

impl Harness {
    pub fn new(pages: usize, profile: TuningProfile, next_chapter: Option<&str>) -> Self {
        let net: NetLog = Rc::default();
        let surfaces = (0..pages)
            .map(|i| {
                (
                    ResourceDescriptor::new(i, format!("/chapter/1/{i:03}.jpg")),
                    MockPage {
                        index: i,
                        rect: Some(layout(i, 0.0)),
                        attached: true,
                        requested: Vec::new(),
                        states: Vec::new(),
                        net: Rc::clone(&net),
                    },
                )
            })
            .collect();
        let client = MockPrefetch::default();
        let prefetched = Rc::clone(&client.issued);
        let view = ReaderView::new(profile, VIEWPORT_HEIGHT, surfaces, next_chapter, client);
        Self {
            view,
            now: Instant::now(),
            net,
            prefetched,
            scroll_y: 0.0,
        }
    }

    pub fn start(pages: usize) -> Self {
        let mut h = Self::new(pages, TuningProfile::default(), None);
        h.view.start(h.now);
        h
    }

    pub fn page(&self, index: usize) -> &MockPage {
        self.view.surface(index).expect("page exists")
    }

    pub fn page_mut(&mut self, index: usize) -> &mut MockPage {
        self.view.surface_mut(index).expect("page exists")
    }

    /// Indices currently loading, ascending.
    pub fn loading(&self) -> Vec<usize> {
        (0..self.view.len())
            .filter(|&i| self.view.state(i) == Some(ResourceState::Loading))
            .collect()
    }

    pub fn requested(&self) -> Vec<usize> {
        self.net.borrow().iter().map(|(i, _)| *i).collect()
    }

    /// Full observed state sequence of a page, starting from `Idle`.
    pub fn sequence(&self, index: usize) -> Vec<ResourceState> {
        let mut seq = vec![ResourceState::Idle];
        seq.extend(self.page(index).states.iter().copied());
        seq
    }

    pub fn load(&mut self, index: usize) {
        self.view.on_fetch_result(index, FetchOutcome::Loaded, self.now);
    }

    pub fn fail(&mut self, index: usize) {
        self.view
            .on_fetch_result(index, FetchOutcome::Failed("HTTP 503".into()), self.now);
    }

    /// Move the clock forward by `ms`, firing every timer due on the way.
    pub fn advance(&mut self, ms: u64) -> usize {
        let target = self.now + Duration::from_millis(ms);
        let mut fired = 0;
        while let Some(deadline) = self.view.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = self.now.max(deadline);
            fired += self.view.poll_timers(self.now);
        }
        self.now = target;
        fired
    }

    /// Jump to the next timer deadline and fire it.
    pub fn next_timer(&mut self) -> Option<usize> {
        let deadline = self.view.next_deadline()?;
        self.now = self.now.max(deadline);
        Some(self.view.poll_timers(self.now))
    }

    /// Scroll to `y` and report the scroll event to the view.
    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y;
        for i in 0..self.view.len() {
            let page = self.page_mut(i);
            if page.rect.is_some() {
                page.rect = Some(layout(i, y));
            }
        }
        self.view.on_scroll(self.now);
    }

    pub fn max_scroll(&self) -> f32 {
        (self.view.len() as f32 * PAGE_HEIGHT - VIEWPORT_HEIGHT).max(0.0)
    }
}

pub fn layout(index: usize, scroll_y: f32) -> PageRect {
    let top = index as f32 * PAGE_HEIGHT - scroll_y;
    PageRect::new(top, top + PAGE_HEIGHT)
}

/// True if `seq` is one of the legal delivery shapes: a run of failed
/// attempts followed by a load, or nothing but failed attempts.
pub fn is_legal_sequence(seq: &[ResourceState]) -> bool {
    use ResourceState::*;
    if seq.first() != Some(&Idle) {
        return false;
    }
    let edges_ok = seq.windows(2).all(|w| {
        matches!(
            (w[0], w[1]),
            (Idle, Loading) | (Loading, Loaded) | (Loading, Error) | (Error, Idle)
        )
    });
    edges_ok && matches!(seq.last(), Some(Idle | Loaded | Error))
}
