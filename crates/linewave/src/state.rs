use crate::kernel::FrameInputs;
use crate::params::ResolvedParams;

/// Fraction of the remaining distance `bend_influence` covers per frame.
pub const SMOOTHING_FACTOR: f32 = 0.1;

/// Device pixel ratios above this are clamped when sizing the backing store.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Pointer position before any pointer event has been seen.
pub const POINTER_SENTINEL: [f32; 2] = [-1000.0, -1000.0];

/// Observed CSS size of the host surface and its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    pub css_width: f32,
    pub css_height: f32,
    pub device_pixel_ratio: f32,
}

impl SurfaceMetrics {
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    /// Ratio applied to CSS pixels, capped at [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        }
    }

    fn css_height_or_one(&self) -> f32 {
        if self.css_height.is_finite() && self.css_height > 0.0 {
            self.css_height
        } else {
            1.0
        }
    }
}

/// Backing-store size in device pixels; each side at least one.
pub fn backing_size(metrics: &SurfaceMetrics) -> [u32; 2] {
    let ratio = metrics.pixel_ratio();
    let side = |css: f32| {
        let css = if css.is_finite() && css > 0.0 { css } else { 1.0 };
        ((css * ratio).floor() as u32).max(1)
    };
    [side(metrics.css_width), side(metrics.css_height)]
}

/// Document scroll geometry used for parallax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f32,
    pub document_height: f32,
    pub viewport_height: f32,
}

impl ScrollMetrics {
    /// Scroll progress, zero when the document does not scroll.
    pub fn progress(&self) -> f32 {
        let max_scroll = self.document_height - self.viewport_height;
        if max_scroll > 0.0 && self.scroll_y.is_finite() {
            self.scroll_y / max_scroll
        } else {
            0.0
        }
    }
}

/// Mutable per-surface state advanced by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub elapsed: f32,
    pub resolution: [u32; 2],
    pub metrics: SurfaceMetrics,
    pub pointer: [f32; 2],
    pub bend_influence: f32,
    pub bend_target: f32,
    pub parallax_offset: [f32; 2],
}

impl RenderState {
    pub fn new(metrics: SurfaceMetrics) -> Self {
        Self {
            elapsed: 0.0,
            resolution: backing_size(&metrics),
            metrics,
            pointer: POINTER_SENTINEL,
            bend_influence: 0.0,
            bend_target: 0.0,
            parallax_offset: [0.0, 0.0],
        }
    }

    /// Moves `bend_influence` one smoothing step toward its target.
    pub fn step_influence(&mut self) {
        self.bend_influence += (self.bend_target - self.bend_influence) * SMOOTHING_FACTOR;
        self.bend_influence = self.bend_influence.clamp(0.0, 1.0);
    }

    /// Records new surface metrics. Returns the new backing size only when it
    /// differs from the current resolution.
    pub fn apply_resize(&mut self, metrics: SurfaceMetrics) -> Option<[u32; 2]> {
        self.metrics = metrics;
        let size = backing_size(&metrics);
        if size == self.resolution {
            return None;
        }
        self.resolution = size;
        Some(size)
    }

    /// `x`, `y` are CSS pixels relative to the surface's top-left corner.
    pub fn apply_pointer_move(&mut self, x: f32, y: f32) {
        let ratio = self.metrics.pixel_ratio();
        let height = self.metrics.css_height_or_one();
        self.pointer = [x * ratio, (height - y) * ratio];
        self.bend_target = 1.0;
    }

    pub fn apply_pointer_leave(&mut self) {
        self.bend_target = 0.0;
    }

    pub fn apply_scroll(&mut self, scroll: &ScrollMetrics, strength: f32) {
        let n = scroll.progress();
        self.parallax_offset = [n * strength, n * strength * 0.5];
    }

    pub fn frame_inputs(&self, params: &ResolvedParams) -> FrameInputs {
        FrameInputs {
            params: *params,
            time: self.elapsed,
            resolution: [self.resolution[0] as f32, self.resolution[1] as f32],
            pointer: self.pointer,
            bend_influence: self.bend_influence,
            parallax_offset: self.parallax_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_caps_ratio_and_floors() {
        assert_eq!(backing_size(&SurfaceMetrics::new(100.5, 50.0, 3.0)), [201, 100]);
        assert_eq!(backing_size(&SurfaceMetrics::new(100.0, 50.0, 1.5)), [150, 75]);
        assert_eq!(backing_size(&SurfaceMetrics::new(0.0, -4.0, 1.0)), [1, 1]);
        assert_eq!(backing_size(&SurfaceMetrics::new(10.0, 10.0, f32::NAN)), [10, 10]);
    }

    #[test]
    fn pointer_is_scaled_and_flipped() {
        let mut state = RenderState::new(SurfaceMetrics::new(200.0, 100.0, 2.0));
        state.apply_pointer_move(10.0, 30.0);
        assert_eq!(state.pointer, [20.0, 140.0]);
        assert_eq!(state.bend_target, 1.0);
        state.apply_pointer_leave();
        assert_eq!(state.bend_target, 0.0);
        assert_eq!(state.pointer, [20.0, 140.0]);
    }

    #[test]
    fn scroll_without_overflow_is_zero() {
        let mut state = RenderState::new(SurfaceMetrics::new(10.0, 10.0, 1.0));
        let flat = ScrollMetrics {
            scroll_y: 300.0,
            document_height: 800.0,
            viewport_height: 800.0,
        };
        state.apply_scroll(&flat, 0.1);
        assert_eq!(state.parallax_offset, [0.0, 0.0]);

        let half = ScrollMetrics {
            scroll_y: 400.0,
            document_height: 1600.0,
            viewport_height: 800.0,
        };
        state.apply_scroll(&half, 0.1);
        assert!((state.parallax_offset[0] - 0.05).abs() < 1e-6);
        assert!((state.parallax_offset[1] - 0.025).abs() < 1e-6);
    }

    #[test]
    fn influence_steps_geometrically() {
        let mut state = RenderState::new(SurfaceMetrics::new(10.0, 10.0, 1.0));
        state.bend_target = 1.0;
        state.step_influence();
        assert!((state.bend_influence - 0.1).abs() < 1e-6);
        state.step_influence();
        assert!((state.bend_influence - 0.19).abs() < 1e-6);
    }
}
