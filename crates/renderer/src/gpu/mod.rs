//! GPU side of the windowed renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the wrapped GLSL kernel into a render pipeline with a
//!   single uniform bind group.
//! - `state` glues both together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;

pub(crate) use context::GpuInitError;
pub(crate) use state::GpuState;
