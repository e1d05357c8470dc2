//! Renderer crate for FloatingLines.
//!
//! The crate hosts the `linewave` driver on a real surface. The overall flow is:
//!
//! ```text
//!   CLI / floatlines
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowHost (SurfaceHost) ──▶ winit event loop ──▶ Driver::frame()
//!          │                                                   │
//!          │                                                   └─▶ LineUniforms ─▶ GPU UBO
//!          └─▶ export::write_png (RenderPolicy::Export, CPU kernel, no window)
//! ```
//!
//! `WindowHost` owns every GPU resource (surface, device, pipeline, uniform
//! buffer) and forwards pointer, wheel and resize input into the driver's
//! event queue. The GLSL kernel from `linewave::shader` is wrapped at runtime
//! so it can be compiled by naga's GLSL frontend.

mod compile;
mod export;
mod gpu;
mod runtime;
mod scroll;
mod types;
mod window;

use std::path::PathBuf;

use thiserror::Error;

use linewave::DriverError;

pub use runtime::{time_source_for_policy, FrameScheduler, RenderPolicy};
pub use types::{AdapterProfile, Antialiasing, ColorSpaceMode, RendererConfig, SurfaceAlpha};

#[derive(Debug, Error)]
pub enum RendererError {
    /// No display or GPU is available; the caller should degrade gracefully.
    #[error("rendering unsupported on this system: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DriverError> for RendererError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Unsupported(reason) => RendererError::Unsupported(reason),
            other => RendererError::Other(other.into()),
        }
    }
}

/// Entry point used by the CLI to drive rendering.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs until the window closes, or returns the written path for exports.
    pub fn run(self) -> Result<Option<PathBuf>, RendererError> {
        match &self.config.policy {
            RenderPolicy::Export { time, path } => {
                let written = export::write_png(
                    &self.config.lines,
                    self.config.surface_size,
                    time.unwrap_or(0.0),
                    path,
                )?;
                tracing::info!(path = %written.display(), "still frame exported");
                Ok(Some(written))
            }
            RenderPolicy::Animate { .. } | RenderPolicy::Still { .. } => {
                window::run(self.config)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn driver_unsupported_maps_to_renderer_unsupported() {
        let err: RendererError = DriverError::Unsupported("no adapter".to_string()).into();
        assert!(matches!(err, RendererError::Unsupported(reason) if reason == "no adapter"));

        let err: RendererError = DriverError::Disposed.into();
        assert!(matches!(err, RendererError::Other(_)));
    }

    #[test]
    fn export_policy_runs_without_a_window() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.png");
        let renderer = Renderer::new(RendererConfig {
            surface_size: (32, 18),
            policy: RenderPolicy::Export {
                time: Some(2.0),
                path: path.clone(),
            },
            ..RendererConfig::default()
        });
        let written = renderer.run().unwrap();
        assert_eq!(written, Some(path.clone()));
        assert!(path.exists());
    }
}
