//! Render loop driver.
//!
//! A [`Driver`] owns the resolved parameters and [`RenderState`] of one
//! mounted surface and talks to the outside world through a [`SurfaceHost`]:
//! the host owns GPU resources, delivers frame callbacks and forwards input.
//! Input never mutates state directly. Hosts push [`SurfaceEvent`]s through
//! an [`EventSender`], and the driver drains the queue once at the start of
//! each frame.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use thiserror::Error;

use crate::kernel::FrameInputs;
use crate::params::{RenderConfig, ResolvedParams};
use crate::state::{RenderState, ScrollMetrics, SurfaceMetrics};
use crate::time::BoxedTimeSource;

/// Handle for a frame callback requested from the host.
pub type FrameId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Disposed,
}

/// Input sources a host can wire up for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Pointer,
    Scroll,
    Resize,
}

/// Input observed by the host between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// CSS pixels relative to the surface's top-left corner.
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Scrolled(ScrollMetrics),
    Resized(SurfaceMetrics),
}

/// Cloneable producer side of the driver's event queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<SurfaceEvent>,
}

impl EventSender {
    /// Queues an event. Returns false once the driver is gone.
    pub fn send(&self, event: SurfaceEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn pointer_moved(&self, x: f32, y: f32) -> bool {
        self.send(SurfaceEvent::PointerMoved { x, y })
    }

    pub fn pointer_left(&self) -> bool {
        self.send(SurfaceEvent::PointerLeft)
    }

    pub fn scrolled(&self, metrics: ScrollMetrics) -> bool {
        self.send(SurfaceEvent::Scrolled(metrics))
    }

    pub fn resized(&self, metrics: SurfaceMetrics) -> bool {
        self.send(SurfaceEvent::Resized(metrics))
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    /// No GPU-capable context could be obtained.
    #[error("rendering context unavailable: {0}")]
    Unsupported(String),
    /// The host cannot observe size changes; the mount-time size is kept.
    #[error("surface size observation is unavailable")]
    ObserverUnavailable,
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("rendering context unavailable: {0}")]
    Unsupported(String),
    #[error("driver has been disposed")]
    Disposed,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Outcome of a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The callback was stale or the driver is not running.
    Skipped,
}

/// Platform side of a mounted background.
pub trait SurfaceHost {
    /// Current CSS size and device pixel ratio of the host surface.
    fn measure(&self) -> SurfaceMetrics;
    /// Creates GPU resources (context, program, geometry) for `params`.
    fn acquire(&mut self, params: &ResolvedParams, resolution: [u32; 2]) -> Result<(), HostError>;
    /// Starts forwarding input of `kind` into `events`.
    fn attach(&mut self, kind: ListenerKind, events: EventSender) -> Result<(), HostError>;
    fn detach(&mut self, kind: ListenerKind);
    /// Schedules a frame callback; the host later calls [`Driver::frame`] with the id.
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
    fn resize_backing(&mut self, size: [u32; 2]);
    /// Synthesises and shows one frame.
    fn present(&mut self, inputs: &FrameInputs) -> Result<(), HostError>;
    /// Drops every GPU resource created by `acquire`.
    fn release(&mut self);
}

pub struct Driver<H: SurfaceHost> {
    host: H,
    params: ResolvedParams,
    state: RenderState,
    clock: BoxedTimeSource,
    lifecycle: Lifecycle,
    events_tx: Sender<SurfaceEvent>,
    events_rx: Receiver<SurfaceEvent>,
    listeners: Vec<ListenerKind>,
    pending_frame: Option<FrameId>,
    acquired: bool,
    frames_presented: u64,
}

impl<H: SurfaceHost> Driver<H> {
    pub fn new(host: H, config: &RenderConfig, clock: BoxedTimeSource) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let params = config.resolve();
        let state = RenderState::new(host.measure());
        Self {
            host,
            params,
            state,
            clock,
            lifecycle: Lifecycle::Idle,
            events_tx,
            events_rx,
            listeners: Vec::new(),
            pending_frame: None,
            acquired: false,
            frames_presented: 0,
        }
    }

    /// Acquires GPU resources, wires listeners and schedules the first frame.
    pub fn mount(&mut self) -> Result<(), DriverError> {
        match self.lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Disposed => return Err(DriverError::Disposed),
            Lifecycle::Idle => {}
        }

        self.state = RenderState::new(self.host.measure());
        self.host
            .acquire(&self.params, self.state.resolution)
            .map_err(|err| match err {
                HostError::Unsupported(reason) => DriverError::Unsupported(reason),
                other => DriverError::Host(other),
            })?;
        self.acquired = true;

        let mut kinds = Vec::with_capacity(3);
        if self.params.interactive {
            kinds.push(ListenerKind::Pointer);
        }
        if self.params.parallax {
            kinds.push(ListenerKind::Scroll);
        }
        kinds.push(ListenerKind::Resize);

        for kind in kinds {
            let sender = self.events();
            match self.host.attach(kind, sender) {
                Ok(()) => self.listeners.push(kind),
                Err(HostError::ObserverUnavailable) if kind == ListenerKind::Resize => {
                    tracing::warn!("resize observation unavailable; keeping mount-time size");
                }
                Err(err) => {
                    self.teardown();
                    return Err(err.into());
                }
            }
        }

        self.clock.reset();
        self.lifecycle = Lifecycle::Running;
        self.pending_frame = Some(self.host.request_frame());
        tracing::debug!(
            width = self.state.resolution[0],
            height = self.state.resolution[1],
            listeners = self.listeners.len(),
            lines = self.params.visible_lines(),
            "line-wave surface mounted"
        );
        Ok(())
    }

    /// Frame callback. Ids other than the pending one are ignored.
    pub fn frame(&mut self, id: FrameId) -> Result<FrameStatus, DriverError> {
        if self.lifecycle != Lifecycle::Running || self.pending_frame != Some(id) {
            tracing::trace!(id, lifecycle = ?self.lifecycle, "skipping frame callback");
            return Ok(FrameStatus::Skipped);
        }
        self.pending_frame = Some(self.host.request_frame());

        self.drain_events();
        let sample = self.clock.sample();
        tracing::trace!(frame = sample.frame_index, seconds = sample.seconds, "frame sampled");
        self.state.elapsed = sample.seconds;
        self.state.step_influence();

        let inputs = self.state.frame_inputs(&self.params);
        self.host.present(&inputs)?;
        self.frames_presented = self.frames_presented.saturating_add(1);
        Ok(FrameStatus::Presented)
    }

    /// Tears down and rebuilds against a new configuration.
    pub fn reconfigure(&mut self, config: &RenderConfig) -> Result<(), DriverError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Err(DriverError::Disposed);
        }
        let was_running = self.lifecycle == Lifecycle::Running;
        self.teardown();
        self.params = config.resolve();
        self.lifecycle = Lifecycle::Idle;
        tracing::debug!("line-wave configuration replaced");
        if was_running {
            self.mount()?;
        }
        Ok(())
    }

    /// Cancels the pending frame, detaches listeners and releases GPU
    /// resources. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.teardown();
        self.lifecycle = Lifecycle::Disposed;
        tracing::debug!(frames = self.frames_presented, "line-wave surface disposed");
    }

    /// Producer handle for the event queue.
    pub fn events(&self) -> EventSender {
        EventSender {
            tx: self.events_tx.clone(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    pub fn listeners(&self) -> &[ListenerKind] {
        &self.listeners
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn drain_events(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::PointerMoved { x, y } if self.params.interactive => {
                self.state.apply_pointer_move(x, y);
            }
            SurfaceEvent::PointerLeft if self.params.interactive => {
                self.state.apply_pointer_leave();
            }
            SurfaceEvent::Scrolled(scroll) if self.params.parallax => {
                self.state.apply_scroll(&scroll, self.params.parallax_strength);
            }
            SurfaceEvent::Resized(metrics) => {
                if let Some(size) = self.state.apply_resize(metrics) {
                    tracing::debug!(width = size[0], height = size[1], "resizing backing store");
                    self.host.resize_backing(size);
                }
            }
            _ => {}
        }
    }

    fn teardown(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.host.cancel_frame(id);
        }
        for kind in self.listeners.drain(..) {
            self.host.detach(kind);
        }
        if self.acquired {
            self.host.release();
            self.acquired = false;
        }
        while self.events_rx.try_recv().is_ok() {}
    }
}

impl<H: SurfaceHost> Drop for Driver<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
