use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use linewave::{
    Driver, EventSender, FrameId, FrameInputs, HostError, Lifecycle, ListenerKind,
    ResolvedParams, SurfaceHost, SurfaceMetrics,
};

use crate::gpu::{GpuInitError, GpuState};
use crate::runtime::{time_source_for_policy, FrameScheduler, RenderPolicy};
use crate::scroll::VirtualScroll;
use crate::types::{Antialiasing, ColorSpaceMode, RendererConfig, SurfaceAlpha};
use crate::RendererError;

const SOFTWARE_FPS_CAP: f32 = 15.0;
const WINDOW_TITLE: &str = "FloatingLines";

/// [`SurfaceHost`] backed by a winit window and a wgpu swapchain.
pub(crate) struct WindowHost {
    window: Arc<Window>,
    gpu: Option<GpuState>,
    antialiasing: Antialiasing,
    color_space: ColorSpaceMode,
    surface_alpha: SurfaceAlpha,
    listeners: HashMap<ListenerKind, EventSender>,
    scroll: VirtualScroll,
    scheduler: FrameScheduler,
    next_frame: FrameId,
    requested_frame: Option<FrameId>,
}

impl WindowHost {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Self {
        let viewport_height = css_metrics(&window).css_height;
        Self {
            window,
            gpu: None,
            antialiasing: config.antialiasing,
            color_space: config.color_space,
            surface_alpha: config.surface_alpha,
            listeners: HashMap::new(),
            scroll: VirtualScroll::new(viewport_height, config.scroll_pages),
            scheduler: FrameScheduler::new(config.policy.clone()),
            next_frame: 0,
            requested_frame: None,
        }
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn listener(&self, kind: ListenerKind) -> Option<&EventSender> {
        self.listeners.get(&kind)
    }

    fn handle_cursor_moved(&self, position: PhysicalPosition<f64>) {
        if let Some(events) = self.listener(ListenerKind::Pointer) {
            let scale = self.window.scale_factor();
            events.pointer_moved((position.x / scale) as f32, (position.y / scale) as f32);
        }
    }

    fn handle_cursor_left(&self) {
        if let Some(events) = self.listener(ListenerKind::Pointer) {
            events.pointer_left();
        }
    }

    fn handle_wheel(&mut self, delta: winit::event::MouseScrollDelta) {
        if !self.listeners.contains_key(&ListenerKind::Scroll) {
            return;
        }
        let metrics = self.scroll.apply_wheel(delta);
        if let Some(events) = self.listener(ListenerKind::Scroll) {
            events.scrolled(metrics);
        }
    }

    fn handle_surface_changed(&mut self) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(self.window.inner_size());
        }
        let metrics = css_metrics(&self.window);
        let scroll = self.scroll.set_viewport_height(metrics.css_height);
        if let Some(events) = self.listener(ListenerKind::Scroll) {
            events.scrolled(scroll);
        }
        if let Some(events) = self.listener(ListenerKind::Resize) {
            events.resized(metrics);
        }
        self.scheduler.invalidate();
    }

    /// Decides whether the pending frame callback should fire now.
    fn schedule(&self, now: Instant) -> ControlFlow {
        if self.requested_frame.is_none() {
            return ControlFlow::Wait;
        }
        if self.scheduler.ready_for_frame(now) {
            tracing::trace!("scheduler: issuing redraw now");
            self.window.request_redraw();
            ControlFlow::Wait
        } else if let Some(deadline) = self.scheduler.next_deadline() {
            tracing::trace!(
                deadline_ms = deadline.saturating_duration_since(now).as_millis(),
                "scheduler: waiting until next frame"
            );
            ControlFlow::WaitUntil(deadline)
        } else {
            ControlFlow::Wait
        }
    }

    fn cap_software_rendering(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        let profile = gpu.adapter_profile();
        let uncapped = matches!(
            self.scheduler.policy(),
            RenderPolicy::Animate { target_fps: None }
        );
        if profile.is_software() && uncapped {
            tracing::warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping frame rate (override with --fps)"
            );
            self.scheduler = FrameScheduler::new(RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP),
            });
        }
    }
}

impl SurfaceHost for WindowHost {
    fn measure(&self) -> SurfaceMetrics {
        css_metrics(&self.window)
    }

    /// The swapchain always matches the window's drawable size; the capped
    /// `resolution` only reaches the shader through the uniform block.
    fn acquire(&mut self, params: &ResolvedParams, resolution: [u32; 2]) -> Result<(), HostError> {
        let size = self.window.inner_size();
        let gpu = GpuState::new(
            self.window.clone(),
            size,
            self.antialiasing,
            self.color_space,
            self.surface_alpha,
        )
        .map_err(|err| match err {
            GpuInitError::NoAdapter(reason) => HostError::Unsupported(reason),
            GpuInitError::Other(err) => HostError::Other(format!("{err:#}")),
        })?;
        tracing::info!(
            adapter = %gpu.adapter_profile().name,
            width = size.width,
            height = size.height,
            backing_width = resolution[0],
            backing_height = resolution[1],
            lines = params.visible_lines(),
            "GPU surface ready"
        );
        self.gpu = Some(gpu);
        if let Err(err) = self.window.set_cursor_hittest(params.interactive) {
            tracing::debug!(error = %err, "cursor hit-testing not configurable on this platform");
        }
        self.cap_software_rendering();
        self.scheduler.reset();
        Ok(())
    }

    fn attach(&mut self, kind: ListenerKind, events: EventSender) -> Result<(), HostError> {
        self.listeners.insert(kind, events);
        Ok(())
    }

    fn detach(&mut self, kind: ListenerKind) {
        self.listeners.remove(&kind);
    }

    fn request_frame(&mut self) -> FrameId {
        self.next_frame += 1;
        self.requested_frame = Some(self.next_frame);
        self.next_frame
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.requested_frame == Some(id) {
            self.requested_frame = None;
        }
    }

    fn resize_backing(&mut self, size: [u32; 2]) {
        tracing::debug!(width = size[0], height = size[1], "backing resolution changed");
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(self.window.inner_size());
        }
        self.scheduler.invalidate();
    }

    fn present(&mut self, inputs: &FrameInputs) -> Result<(), HostError> {
        let gpu = self
            .gpu
            .as_mut()
            .ok_or_else(|| HostError::Other("present called before acquire".to_string()))?;
        match gpu.render(inputs) {
            Ok(()) => {
                self.scheduler.mark_rendered();
                Ok(())
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                gpu.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(HostError::Present("surface out of memory".to_string()))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout; retrying next frame");
                Ok(())
            }
            Err(other) => {
                tracing::warn!(error = ?other, "surface error; retrying next frame");
                Ok(())
            }
        }
    }

    fn release(&mut self) {
        if self.gpu.take().is_some() {
            tracing::debug!("GPU surface released");
        }
        self.requested_frame = None;
    }
}

fn css_metrics(window: &Window) -> SurfaceMetrics {
    let size = window.inner_size();
    let scale = window.scale_factor();
    SurfaceMetrics::new(
        (size.width as f64 / scale) as f32,
        (size.height as f64 / scale) as f32,
        scale as f32,
    )
}

/// Opens a window, mounts the line-wave driver on it and runs until closed.
pub(crate) fn run(config: RendererConfig) -> Result<(), RendererError> {
    let event_loop = EventLoop::new()
        .map_err(|err| RendererError::Unsupported(format!("no display available: {err}")))?;

    let logical = LogicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(logical)
        .with_transparent(config.surface_alpha == SurfaceAlpha::Transparent)
        .build(&event_loop)
        .map_err(|err| RendererError::Unsupported(format!("failed to create window: {err}")))?;
    let window = Arc::new(window);

    let host = WindowHost::new(window, &config);
    let mut driver = Driver::new(host, &config.lines, time_source_for_policy(&config.policy));
    driver.mount()?;

    let fatal: Rc<RefCell<Option<RendererError>>> = Rc::new(RefCell::new(None));
    let fatal_slot = Rc::clone(&fatal);
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == driver.host().window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    driver.dispose();
                    elwt.exit();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    driver.host().handle_cursor_moved(position);
                }
                WindowEvent::CursorLeft { .. } => {
                    driver.host().handle_cursor_left();
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    driver.host_mut().handle_wheel(delta);
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    driver.host_mut().handle_surface_changed();
                }
                WindowEvent::RedrawRequested => {
                    let Some(id) = driver.pending_frame() else {
                        return;
                    };
                    if let Err(err) = driver.frame(id) {
                        tracing::error!(error = %err, "frame failed; shutting down");
                        *fatal_slot.borrow_mut() = Some(err.into());
                        driver.dispose();
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            if driver.lifecycle() == Lifecycle::Running {
                elwt.set_control_flow(driver.host().schedule(Instant::now()));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        Event::LoopExiting => {
            driver.dispose();
        }
        _ => {}
    });

    if let Some(err) = fatal.borrow_mut().take() {
        return Err(err);
    }
    run_result.map_err(|err| RendererError::Other(anyhow!("window event loop error: {err}")))
}
