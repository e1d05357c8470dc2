//! Scroll emulation for parallax.
//!
//! A desktop window has no document to scroll, so the mouse wheel drives a
//! virtual one that is `pages` viewports tall.

use linewave::ScrollMetrics;
use winit::event::MouseScrollDelta;

/// Pixels scrolled per wheel notch reported as lines.
pub(crate) const LINE_SCROLL_PX: f32 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VirtualScroll {
    scroll_y: f32,
    viewport_height: f32,
    pages: f32,
}

impl VirtualScroll {
    pub(crate) fn new(viewport_height: f32, pages: f32) -> Self {
        let pages = if pages.is_finite() && pages >= 1.0 {
            pages
        } else {
            1.0
        };
        Self {
            scroll_y: 0.0,
            viewport_height: viewport_height.max(0.0),
            pages,
        }
    }

    pub(crate) fn document_height(&self) -> f32 {
        self.viewport_height * self.pages
    }

    fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Keeps the scroll position proportional when the window height changes.
    pub(crate) fn set_viewport_height(&mut self, height: f32) -> ScrollMetrics {
        let progress = self.metrics().progress();
        self.viewport_height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.scroll_y = progress * self.max_scroll();
        self.metrics()
    }

    pub(crate) fn scroll_by(&mut self, dy: f32) -> ScrollMetrics {
        if dy.is_finite() {
            self.scroll_y = (self.scroll_y + dy).clamp(0.0, self.max_scroll());
        }
        self.metrics()
    }

    /// Wheel up (positive delta) scrolls toward the top of the document.
    pub(crate) fn apply_wheel(&mut self, delta: MouseScrollDelta) -> ScrollMetrics {
        let dy = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -lines * LINE_SCROLL_PX,
            MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
        };
        self.scroll_by(dy)
    }

    pub(crate) fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_y: self.scroll_y,
            document_height: self.document_height(),
            viewport_height: self.viewport_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn wheel_scrolls_within_document() {
        let mut scroll = VirtualScroll::new(500.0, 3.0);
        let metrics = scroll.apply_wheel(MouseScrollDelta::LineDelta(0.0, -5.0));
        assert_eq!(metrics.scroll_y, 200.0);
        assert_eq!(metrics.document_height, 1500.0);
        assert!((metrics.progress() - 0.2).abs() < 1e-6);

        let metrics = scroll.apply_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -5000.0)));
        assert_eq!(metrics.scroll_y, 1000.0);
        assert_eq!(metrics.progress(), 1.0);

        let metrics = scroll.apply_wheel(MouseScrollDelta::LineDelta(0.0, 100.0));
        assert_eq!(metrics.scroll_y, 0.0);
    }

    #[test]
    fn single_page_document_never_scrolls() {
        let mut scroll = VirtualScroll::new(400.0, 0.5);
        let metrics = scroll.scroll_by(120.0);
        assert_eq!(metrics.scroll_y, 0.0);
        assert_eq!(metrics.progress(), 0.0);
    }

    #[test]
    fn resizing_viewport_keeps_progress() {
        let mut scroll = VirtualScroll::new(100.0, 3.0);
        scroll.scroll_by(100.0);
        let metrics = scroll.set_viewport_height(200.0);
        assert_eq!(metrics.scroll_y, 200.0);
        assert!((metrics.progress() - 0.5).abs() < 1e-6);
    }
}
