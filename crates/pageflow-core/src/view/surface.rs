//! Capability interfaces between the engine and the presentation layer.

use crate::resource::ResourceState;
use crate::viewport::PageRect;

/// Outcome of a fetch, reported back to the view by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed(String),
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded)
    }
}

/// One page slot of the presentation layer.
///
/// The engine never renders; it asks the surface where it is, whether it is
/// still part of the view, tells it to start a fetch, and tells it about
/// state changes so the presentation can show a placeholder, the image, or
/// an error affordance. Fetch results come back through
/// `ReaderView::on_fetch_result`.
pub trait PageSurface {
    /// Bounding box relative to the viewport top, or `None` if not laid out.
    fn visible_position(&self) -> Option<PageRect>;

    /// False once the page has been removed from the view.
    fn is_attached(&self) -> bool;

    /// Start fetching `location`. Must not call back into the view synchronously.
    fn request_fetch(&mut self, location: &str);

    /// Reflect a delivery state change.
    fn reflect_state(&mut self, _state: ResourceState) {}
}

/// Out-of-band fetches for the next chapter; never attached to the view.
/// Results come back through `ReaderView::on_prefetch_result`.
pub trait PrefetchClient {
    fn prefetch(&mut self, location: &str);
}

/// Prefetch client for views without a next chapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrefetch;

impl PrefetchClient for NoPrefetch {
    fn prefetch(&mut self, location: &str) {
        tracing::debug!(%location, "prefetch requested without a client; ignored");
    }
}
