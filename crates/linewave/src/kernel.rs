//! CPU reference of the wave synthesis kernel.
//!
//! The GLSL fragment shader in [`crate::shader`] computes the same function;
//! this version backs still export and lets the visual properties be tested
//! without a GPU. Every pixel is a pure function of [`FrameInputs`] and its
//! own coordinate.

use crate::params::{Band, BandParams, ResolvedParams};

const GLOW_NUMERATOR: f32 = 0.0175;
const GLOW_SOFTENING: f32 = 0.01;
const GLOW_FLOOR: f32 = 1e-3;
const GLOW_BIAS: f32 = 0.01;
const AMPLITUDE_SCALE: f32 = 0.15;

/// Per-band amplitude ramp and compositing weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStyle {
    pub base_amplitude: f32,
    pub amplitude_step: f32,
    pub weight: f32,
    pub mirrored: bool,
}

impl BandStyle {
    pub const fn for_band(band: Band) -> Self {
        match band {
            Band::Bottom => Self {
                base_amplitude: 1.5,
                amplitude_step: 0.2,
                weight: 0.2,
                mirrored: false,
            },
            Band::Middle => Self {
                base_amplitude: 2.0,
                amplitude_step: 0.15,
                weight: 1.0,
                mirrored: false,
            },
            Band::Top => Self {
                base_amplitude: 1.0,
                amplitude_step: 0.2,
                weight: 0.1,
                mirrored: true,
            },
        }
    }

    pub fn amplitude(&self, line: u32) -> f32 {
        self.base_amplitude + self.amplitude_step * line as f32
    }
}

/// Everything one frame of synthesis reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub params: ResolvedParams,
    pub time: f32,
    /// Backing-store size in device pixels.
    pub resolution: [f32; 2],
    /// Device pixels, bottom-left origin.
    pub pointer: [f32; 2],
    pub bend_influence: f32,
    pub parallax_offset: [f32; 2],
}

impl FrameInputs {
    /// Normalised kernel coordinate for a fragment position.
    pub fn base_uv(&self, frag: [f32; 2]) -> [f32; 2] {
        let [w, h] = self.resolution;
        let mut uv = [(2.0 * frag[0] - w) / h, -(2.0 * frag[1] - h) / h];
        if self.params.parallax {
            uv[0] += self.parallax_offset[0];
            uv[1] += self.parallax_offset[1];
        }
        uv
    }

    /// Pointer in kernel space, or the origin when not interactive.
    pub fn pointer_uv(&self) -> [f32; 2] {
        if !self.params.interactive {
            return [0.0, 0.0];
        }
        let [w, h] = self.resolution;
        [
            (2.0 * self.pointer[0] - w) / h,
            -(2.0 * self.pointer[1] - h) / h,
        ]
    }
}

/// Three-octave sine displacement shared by every band.
pub fn waveform(x: f32, time: f32, amplitude: f32) -> f32 {
    let mut y = (x * 0.3 + time * 0.5).sin() * 0.3;
    y += (x * 0.7 - time * 0.3).sin() * 0.15;
    y += (x * 1.1 + time * 0.7).sin() * 0.1;
    y * amplitude * AMPLITUDE_SCALE
}

/// Vertical pointer bend contributed at `distance` from the pointer.
///
/// Zero at or beyond the bend radius, full `strength * influence` at the
/// pointer itself.
pub fn bend_offset(params: &ResolvedParams, influence: f32, distance: f32) -> f32 {
    if !params.interactive || influence <= 0.0 {
        return 0.0;
    }
    smoothstep(params.bend_radius, 0.0, distance) * params.bend_strength * influence
}

/// Glow contribution of a line whose centre sits at `line_y`.
pub fn glow(sample_y: f32, line_y: f32) -> f32 {
    GLOW_NUMERATOR / ((sample_y - line_y).abs() + GLOW_SOFTENING).max(GLOW_FLOOR) + GLOW_BIAS
}

/// Gradient color for line `index` of a band with `count` lines.
pub fn line_color(params: &ResolvedParams, index: u32, count: u32) -> [f32; 3] {
    let denominator = (count as f32 - 1.0).max(1.0);
    params.gradient.sample(index as f32 / denominator)
}

/// Accumulated color of a single band at one fragment.
pub fn band_contribution(inputs: &FrameInputs, band: Band, base_uv: [f32; 2], pointer_uv: [f32; 2]) -> [f32; 3] {
    let BandParams {
        enabled,
        line_count,
        line_distance,
        position,
    } = *inputs.params.band(band);
    let mut color = [0.0f32; 3];
    if !enabled || line_count == 0 {
        return color;
    }

    let style = BandStyle::for_band(band);
    let radius = length(base_uv);
    let angle = position.rotate * (radius + 1.0).ln();
    let mut ruv = rotate(base_uv, angle);
    if style.mirrored {
        ruv[0] = -ruv[0];
    }

    let pointer_distance = length([base_uv[0] - pointer_uv[0], base_uv[1] - pointer_uv[1]]);
    let bend = bend_offset(&inputs.params, inputs.bend_influence, pointer_distance);

    for line in 0..line_count {
        let sample_x = ruv[0] + line_distance * line as f32 + position.x;
        let sample_y = ruv[1] + position.y;
        let line_y = waveform(sample_x, inputs.time, style.amplitude(line)) + bend;
        let intensity = glow(sample_y, line_y) * style.weight;
        let tint = line_color(&inputs.params, line, line_count);
        for (channel, t) in color.iter_mut().zip(tint) {
            *channel += t * intensity;
        }
    }
    color
}

/// Shades one fragment; `frag` is in device pixels with a bottom-left origin.
pub fn shade(inputs: &FrameInputs, frag: [f32; 2]) -> [f32; 3] {
    let base_uv = inputs.base_uv(frag);
    let pointer_uv = inputs.pointer_uv();
    let mut color = [0.0f32; 3];
    for band in Band::DRAW_ORDER {
        let contribution = band_contribution(inputs, band, base_uv, pointer_uv);
        for (channel, c) in color.iter_mut().zip(contribution) {
            *channel += c;
        }
    }
    color
}

/// Row-major RGB float image, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 3]] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y` counted from the top.
    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Clamped 8-bit RGBA with opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for channel in pixel {
                out.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
            out.push(255);
        }
        out
    }
}

/// Synthesises the whole surface once, sampling at pixel centres.
pub fn render(inputs: &FrameInputs, target: &mut PixelBuffer) {
    let height = target.height;
    let width = target.width;
    for row in 0..height {
        // Rows are stored top-first; the kernel works bottom-up.
        let frag_y = height as f32 - (row as f32 + 0.5);
        for column in 0..width {
            let frag = [column as f32 + 0.5, frag_y];
            target.pixels[(row * width + column) as usize] = shade(inputs, frag);
        }
    }
}

fn rotate(v: [f32; 2], angle: f32) -> [f32; 2] {
    let (s, c) = angle.sin_cos();
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

fn length(v: [f32; 2]) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderConfig;
    use crate::POINTER_SENTINEL;

    fn inputs() -> FrameInputs {
        FrameInputs {
            params: RenderConfig::default().resolve(),
            time: 1.25,
            resolution: [64.0, 48.0],
            pointer: POINTER_SENTINEL,
            bend_influence: 0.0,
            parallax_offset: [0.0, 0.0],
        }
    }

    #[test]
    fn base_uv_centres_and_flips() {
        let frame = inputs();
        let centre = frame.base_uv([32.0, 24.0]);
        assert!(centre[0].abs() < 1e-6 && centre[1].abs() < 1e-6);
        let top = frame.base_uv([32.0, 48.0]);
        assert!((top[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn parallax_offset_only_applies_when_enabled() {
        let mut frame = inputs();
        frame.parallax_offset = [0.2, 0.1];
        assert_eq!(frame.base_uv([32.0, 24.0]), [0.2, 0.1]);
        frame.params.parallax = false;
        assert_eq!(frame.base_uv([32.0, 24.0]), [0.0, 0.0]);
    }

    #[test]
    fn smoothstep_matches_reversed_edges() {
        assert_eq!(smoothstep(5.0, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(5.0, 0.0, 5.0), 0.0);
        assert_eq!(smoothstep(5.0, 0.0, 9.0), 0.0);
        assert!((smoothstep(5.0, 0.0, 2.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rotation_matches_row_vector_convention() {
        let out = rotate([1.0, 0.0], std::f32::consts::FRAC_PI_2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn glow_peaks_on_the_line() {
        let on = glow(0.3, 0.3);
        let off = glow(0.8, 0.3);
        assert!((on - (0.0175 / 0.01 + 0.01)).abs() < 1e-4);
        assert!(off < on);
        assert!(off > GLOW_BIAS);
    }

    #[test]
    fn band_styles_keep_their_weights() {
        assert_eq!(BandStyle::for_band(Band::Middle).weight, 1.0);
        assert!((BandStyle::for_band(Band::Bottom).amplitude(5) - 2.5).abs() < 1e-6);
        assert!(BandStyle::for_band(Band::Top).mirrored);
    }

    #[test]
    fn render_fills_every_pixel_and_is_finite() {
        let frame = inputs();
        let mut buffer = PixelBuffer::new(16, 9);
        render(&frame, &mut buffer);
        assert!(buffer.pixels().iter().flatten().all(|c| c.is_finite()));
        assert!(buffer.pixels().iter().any(|p| p[0] > 0.0));
        assert_eq!(buffer.to_rgba8().len(), 16 * 9 * 4);
    }
}
