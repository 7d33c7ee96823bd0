//! Viewport tracking: which page the reader is currently on.
//!
//! Pages report their bounding box relative to the top of the viewport. The
//! active page is the one straddling a focus line placed a fixed fraction of
//! the viewport height from the top.

mod coalesce;

pub use coalesce::FrameCoalescer;

/// Vertical extent of a page relative to the viewport top (may be negative
/// when scrolled past).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub top: f32,
    pub bottom: f32,
}

impl PageRect {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// True if the focus line passes through this rect.
    pub fn straddles(&self, line: f32) -> bool {
        self.height() > 0.0 && self.top <= line && self.bottom > line
    }

    /// True if any part of the rect is inside a viewport of `viewport_height`.
    pub fn is_visible_in(&self, viewport_height: f32) -> bool {
        self.bottom > 0.0 && self.top < viewport_height
    }
}

/// Pick the active page from per-page positions in reading order
/// (`None` = page is detached and has no position).
///
/// Order of preference: the first page straddling `focus_line`; the visible
/// page whose center is nearest the focus line; the first page still below
/// the viewport; the last page. Returns `None` only for an empty chapter.
pub fn select_active(
    positions: &[Option<PageRect>],
    viewport_height: f32,
    focus_line: f32,
) -> Option<usize> {
    if positions.is_empty() {
        return None;
    }

    if let Some(i) = positions
        .iter()
        .position(|p| p.map(|r| r.straddles(focus_line)).unwrap_or(false))
    {
        return Some(i);
    }

    let mut nearest: Option<(usize, f32)> = None;
    for (i, rect) in positions.iter().enumerate() {
        let Some(rect) = rect else { continue };
        if !rect.is_visible_in(viewport_height) {
            continue;
        }
        let distance = (rect.center() - focus_line).abs();
        match nearest {
            Some((_, best)) if best <= distance => {}
            _ => nearest = Some((i, distance)),
        }
    }
    if let Some((i, _)) = nearest {
        return Some(i);
    }

    if let Some(i) = positions
        .iter()
        .position(|p| p.map(|r| r.top >= viewport_height).unwrap_or(false))
    {
        return Some(i);
    }

    Some(positions.len() - 1)
}

/// Holds the derived active index for one view.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    focus_line_ratio: f32,
    viewport_height: f32,
    active_index: usize,
}

impl ViewportTracker {
    pub fn new(focus_line_ratio: f32, viewport_height: f32) -> Self {
        Self {
            focus_line_ratio,
            viewport_height: viewport_height.max(0.0),
            active_index: 0,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
    }

    pub fn focus_line(&self) -> f32 {
        self.viewport_height * self.focus_line_ratio
    }

    /// Recompute the active index from current page positions. The index is
    /// unchanged for an empty chapter.
    pub fn recompute(&mut self, positions: &[Option<PageRect>]) -> usize {
        if let Some(i) = select_active(positions, self.viewport_height, self.focus_line()) {
            if i != self.active_index {
                tracing::debug!(from = self.active_index, to = i, "active page changed");
            }
            self.active_index = i;
        }
        self.active_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pages of equal `height` stacked from `offset` (viewport-relative).
    fn stacked(n: usize, height: f32, offset: f32) -> Vec<Option<PageRect>> {
        (0..n)
            .map(|i| {
                let top = offset + i as f32 * height;
                Some(PageRect::new(top, top + height))
            })
            .collect()
    }

    #[test]
    fn straddling_page_wins() {
        // Viewport 1000, focus at 380. Page 2 spans 300..800 after scrolling 700.
        let pos = stacked(5, 500.0, -700.0);
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(2));
    }

    #[test]
    fn first_straddler_in_order() {
        let pos = vec![
            Some(PageRect::new(0.0, 500.0)),
            Some(PageRect::new(100.0, 600.0)),
        ];
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(0));
    }

    #[test]
    fn nearest_visible_center_when_focus_in_gap() {
        // Focus line falls between two pages; page 1's center is closer.
        let pos = vec![
            Some(PageRect::new(0.0, 100.0)),
            Some(PageRect::new(400.0, 500.0)),
        ];
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(1));
    }

    #[test]
    fn first_below_when_nothing_visible() {
        let pos = vec![
            Some(PageRect::new(-900.0, -500.0)),
            Some(PageRect::new(1200.0, 1600.0)),
            Some(PageRect::new(1600.0, 2000.0)),
        ];
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(1));
    }

    #[test]
    fn last_page_when_everything_above() {
        let pos = stacked(3, 100.0, -2000.0);
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(2));
    }

    #[test]
    fn detached_pages_skipped() {
        let pos = vec![None, Some(PageRect::new(200.0, 700.0)), None];
        assert_eq!(select_active(&pos, 1000.0, 380.0), Some(1));
        assert_eq!(select_active(&[None, None], 1000.0, 380.0), Some(1));
    }

    #[test]
    fn empty_chapter_has_no_active_page() {
        assert_eq!(select_active(&[], 1000.0, 380.0), None);
        let mut t = ViewportTracker::new(0.38, 1000.0);
        assert_eq!(t.recompute(&[]), 0);
    }

    #[test]
    fn tracker_uses_focus_ratio() {
        let mut t = ViewportTracker::new(0.38, 1000.0);
        assert!((t.focus_line() - 380.0).abs() < 1e-3);
        let pos = stacked(4, 400.0, -500.0);
        // Page 2 spans 300..700 and contains 380.
        assert_eq!(t.recompute(&pos), 2);
        assert_eq!(t.active_index(), 2);
    }
}
