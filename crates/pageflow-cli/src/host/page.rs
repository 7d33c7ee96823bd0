//! Headless page surfaces: a vertical strip of equal-height pages scrolled
//! by the host.

use std::cell::Cell;
use std::rc::Rc;

use pageflow_core::resource::ResourceState;
use pageflow_core::view::{PageSurface, PrefetchClient};
use pageflow_core::viewport::PageRect;
use tokio::sync::mpsc::UnboundedSender;

use super::transport::{Fetched, Target, Transport};

pub struct HeadlessPage {
    index: usize,
    height: f32,
    scroll_y: Rc<Cell<f32>>,
    transport: Transport,
    tx: UnboundedSender<Fetched>,
    state: ResourceState,
}

impl HeadlessPage {
    pub fn new(
        index: usize,
        height: f32,
        scroll_y: Rc<Cell<f32>>,
        transport: Transport,
        tx: UnboundedSender<Fetched>,
    ) -> Self {
        Self {
            index,
            height,
            scroll_y,
            transport,
            tx,
            state: ResourceState::Idle,
        }
    }
}

impl PageSurface for HeadlessPage {
    fn visible_position(&self) -> Option<PageRect> {
        let top = self.index as f32 * self.height - self.scroll_y.get();
        Some(PageRect::new(top, top + self.height))
    }

    fn is_attached(&self) -> bool {
        true
    }

    fn request_fetch(&mut self, location: &str) {
        self.transport
            .dispatch(Target::Page(self.index), location, &self.tx);
    }

    fn reflect_state(&mut self, state: ResourceState) {
        tracing::trace!(index = self.index, from = %self.state, to = %state, "page state");
        self.state = state;
    }
}

/// Next-chapter fetches through the same transport; bytes are discarded.
pub struct HeadlessPrefetch {
    transport: Transport,
    tx: UnboundedSender<Fetched>,
    issued: usize,
}

impl HeadlessPrefetch {
    pub fn new(transport: Transport, tx: UnboundedSender<Fetched>) -> Self {
        Self {
            transport,
            tx,
            issued: 0,
        }
    }

    pub fn issued(&self) -> usize {
        self.issued
    }
}

impl PrefetchClient for HeadlessPrefetch {
    fn prefetch(&mut self, location: &str) {
        self.issued += 1;
        self.transport.dispatch(Target::Prefetch, location, &self.tx);
    }
}
