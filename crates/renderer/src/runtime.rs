use std::path::PathBuf;
use std::time::{Duration, Instant};

use linewave::{BoxedTimeSource, FixedTimeSource, SystemTimeSource};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames should animate continuously,
/// be evaluated once at a fixed timestamp, or be exported to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Requested frames-per-second cap; `None` or zero renders every vblank.
        target_fps: Option<f32>,
    },
    /// Render a single frame at an optional timestamp and keep it on screen.
    Still {
        /// Timestamp to evaluate the kernel at (seconds).
        time: Option<f32>,
    },
    /// Render one frame on the CPU and write it to a PNG without opening a window.
    Export {
        /// Timestamp to evaluate the kernel at (seconds).
        time: Option<f32>,
        /// Destination path for the exported file.
        path: PathBuf,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } | RenderPolicy::Export { time, .. } => {
            Box::new(FixedTimeSource::new(time.unwrap_or(0.0)))
        }
    }
}

/// Decides when the window host should ask for the next redraw.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    policy: RenderPolicy,
    interval: Option<Duration>,
    last_frame: Option<Instant>,
    dirty: bool,
}

impl FrameScheduler {
    pub fn new(policy: RenderPolicy) -> Self {
        let interval = match &policy {
            RenderPolicy::Animate {
                target_fps: Some(fps),
            } if fps.is_finite() && *fps > 0.0 => Some(Duration::from_secs_f32(1.0 / fps)),
            _ => None,
        };
        Self {
            policy,
            interval,
            last_frame: None,
            dirty: true,
        }
    }

    pub fn policy(&self) -> &RenderPolicy {
        &self.policy
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.policy {
            RenderPolicy::Animate { .. } => match (self.interval, self.last_frame) {
                (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
                _ => true,
            },
            RenderPolicy::Still { .. } | RenderPolicy::Export { .. } => self.dirty,
        }
    }

    /// When the next capped frame is due; `None` when there is nothing to wait for.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.policy {
            RenderPolicy::Animate { .. } => {
                let interval = self.interval?;
                self.last_frame.map(|last| last + interval)
            }
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self) {
        self.mark_rendered_at(Instant::now());
    }

    pub fn mark_rendered_at(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.dirty = false;
    }

    /// Forces a redraw for still frames, e.g. after the surface resized.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_animation_is_always_ready() {
        let mut scheduler = FrameScheduler::new(RenderPolicy::default());
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered_at(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn capped_animation_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(RenderPolicy::Animate {
            target_fps: Some(4.0),
        });
        let start = Instant::now();
        scheduler.mark_rendered_at(start);
        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(100)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(250)));
        assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_millis(250)));
    }

    #[test]
    fn still_frames_render_once_until_invalidated() {
        let mut scheduler = FrameScheduler::new(RenderPolicy::Still { time: Some(1.0) });
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered_at(now);
        assert!(!scheduler.ready_for_frame(now + Duration::from_secs(5)));
        scheduler.invalidate();
        assert!(scheduler.ready_for_frame(now));
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let scheduler = FrameScheduler::new(RenderPolicy::Animate {
            target_fps: Some(0.0),
        });
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn still_policy_uses_fixed_time() {
        let mut source = time_source_for_policy(&RenderPolicy::Still { time: Some(4.0) });
        assert_eq!(source.sample().seconds, 4.0);
        assert_eq!(source.sample().seconds, 4.0);
    }
}
