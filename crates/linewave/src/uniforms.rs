use bytemuck::{Pod, Zeroable};

use crate::gradient::MAX_GRADIENT_STOPS;
use crate::kernel::FrameInputs;
use crate::params::Band;

/// std140 uniform block read by the GLSL kernel (`LineUniforms` in
/// [`crate::shader::UNIFORM_BLOCK`]).
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineUniforms {
    /// xy backing size, z elapsed seconds.
    pub resolution: [f32; 4],
    /// xy pointer (device px, bottom-left origin), z bend influence, w interactive flag.
    pub pointer: [f32; 4],
    /// x radius, y strength, z parallax flag, w parallax strength.
    pub bend: [f32; 4],
    /// xy parallax offset.
    pub parallax: [f32; 4],
    /// Enabled flags for top, middle, bottom; w gradient stop count.
    pub enabled: [i32; 4],
    pub line_count: [i32; 4],
    pub line_distance: [f32; 4],
    /// xyz = (x, y, rotate) per band, indexed top, middle, bottom.
    pub band_position: [[f32; 4]; 3],
    pub gradient: [[f32; 4]; MAX_GRADIENT_STOPS],
}

unsafe impl Zeroable for LineUniforms {}
unsafe impl Pod for LineUniforms {}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl LineUniforms {
    pub fn from_inputs(inputs: &FrameInputs) -> Self {
        let params = &inputs.params;
        let mut uniforms = Self::zeroed();

        uniforms.resolution = [inputs.resolution[0], inputs.resolution[1], inputs.time, 0.0];
        uniforms.pointer = [
            inputs.pointer[0],
            inputs.pointer[1],
            inputs.bend_influence,
            flag(params.interactive),
        ];
        uniforms.bend = [
            params.bend_radius,
            params.bend_strength,
            flag(params.parallax),
            params.parallax_strength,
        ];
        uniforms.parallax = [inputs.parallax_offset[0], inputs.parallax_offset[1], 0.0, 0.0];

        for band in Band::ALL {
            let index = band.index();
            let resolved = params.band(band);
            uniforms.enabled[index] = i32::from(resolved.enabled);
            uniforms.line_count[index] = resolved.line_count as i32;
            uniforms.line_distance[index] = resolved.line_distance;
            uniforms.band_position[index] = [
                resolved.position.x,
                resolved.position.y,
                resolved.position.rotate,
                0.0,
            ];
        }
        uniforms.enabled[3] = params.gradient.len() as i32;

        for (slot, stop) in uniforms.gradient.iter_mut().zip(params.gradient.raw_stops()) {
            *slot = [stop[0], stop[1], stop[2], 1.0];
        }
        uniforms
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
