use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;

use linewave::{kernel, PixelBuffer, RenderConfig, RenderState, SurfaceMetrics};

/// Renders one frame on the CPU with the reference kernel and writes it to `path`.
///
/// `size` is in device pixels; the pointer is parked and parallax is zero, so
/// the result depends only on `lines` and `time`.
pub(crate) fn write_png(
    lines: &RenderConfig,
    size: (u32, u32),
    time: f32,
    path: &Path,
) -> Result<PathBuf> {
    let params = lines.resolve();
    let mut state = RenderState::new(SurfaceMetrics::new(size.0 as f32, size.1 as f32, 1.0));
    state.elapsed = if time.is_finite() { time } else { 0.0 };
    let inputs = state.frame_inputs(&params);

    let [width, height] = state.resolution;
    let mut buffer = PixelBuffer::new(width, height);
    kernel::render(&inputs, &mut buffer);
    tracing::debug!(width, height, time, "rendered still frame on the CPU");

    let image = RgbaImage::from_raw(width, height, buffer.to_rgba8())
        .context("pixel buffer does not match image dimensions")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
