//! Procedural floating line-wave background.
//!
//! Three bands of sine-composite lines glow over black, optionally bent toward
//! the pointer and shifted by scroll parallax. Configuration flows one way:
//! [`RenderConfig`] resolves into [`ResolvedParams`], the [`Driver`] advances a
//! [`RenderState`] per frame, and the kernel turns the resulting
//! [`FrameInputs`] into pixels, either on the CPU ([`kernel::render`]) or on
//! the GPU through [`shader`] and [`LineUniforms`].

pub mod driver;
pub mod gradient;
pub mod kernel;
pub mod params;
pub mod shader;
pub mod state;
pub mod time;
pub mod uniforms;

pub use driver::{
    Driver, DriverError, EventSender, FrameId, FrameStatus, HostError, Lifecycle, ListenerKind,
    SurfaceEvent, SurfaceHost,
};
pub use gradient::{parse_hex, Gradient, MAX_GRADIENT_STOPS};
pub use kernel::{FrameInputs, PixelBuffer};
pub use params::{
    Band, BandParams, BandPosition, LineSetting, RenderConfig, ResolvedParams, WavePosition,
    MAX_LINES_PER_BAND,
};
pub use state::{
    backing_size, RenderState, ScrollMetrics, SurfaceMetrics, MAX_PIXEL_RATIO, POINTER_SENTINEL,
    SMOOTHING_FACTOR,
};
pub use time::{
    BoxedTimeSource, FixedTimeSource, SteppedTimeSource, SystemTimeSource, TimeSample, TimeSource,
};
pub use uniforms::LineUniforms;
