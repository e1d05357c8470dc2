use linewave::RenderConfig;

use crate::runtime::RenderPolicy;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`: kernel output is written to the swapchain untouched.
    #[default]
    Auto,
    /// Treat kernel output as display-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat kernel output as linear and let an sRGB swapchain encode it.
    Linear,
}

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Black background, alpha fixed at one.
    #[default]
    Opaque,
    /// Unlit pixels are transparent and line glow is premultiplied.
    Transparent,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Summary of the adapter wgpu picked, used for logging and throttling.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub(crate) fn from_info(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in logical pixels; export size in device pixels.
    pub surface_size: (u32, u32),
    /// Line-wave configuration handed to the driver.
    pub lines: RenderConfig,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
    pub surface_alpha: SurfaceAlpha,
    /// Height of the virtual scroll document in viewports (parallax input).
    pub scroll_pages: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            lines: RenderConfig::default(),
            policy: RenderPolicy::default(),
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            surface_alpha: SurfaceAlpha::default(),
            scroll_pages: 3.0,
        }
    }
}
