//! GLSL rendition of [`crate::kernel`].
//!
//! [`UNIFORM_BLOCK`] mirrors [`crate::uniforms::LineUniforms`] field for
//! field. [`KERNEL`] defines `mainImage(out vec4, in vec2)` taking a
//! bottom-left-origin fragment coordinate; hosts wrap both with a version
//! directive and an entry point of their own.

/// Binding used for the uniform block (set 0).
pub const UNIFORM_BINDING: u32 = 0;

pub const UNIFORM_BLOCK: &str = r"
layout(std140, set = 0, binding = 0) uniform LineUniforms {
    vec4 resolution;
    vec4 pointer;
    vec4 bend;
    vec4 parallax;
    ivec4 enabled;
    ivec4 line_count;
    vec4 line_distance;
    vec4 band_position[3];
    vec4 gradient[8];
} lw;
";

pub const KERNEL: &str = r"
const int LW_MAX_LINES = 30;

vec3 lw_line_color(float t) {
    int count = lw.enabled.w;
    if (count <= 0) {
        return vec3(0.0);
    }
    if (count == 1) {
        return lw.gradient[0].rgb;
    }
    float pos = clamp(t, 0.0, 1.0) * float(count - 1);
    int idx = min(int(floor(pos)), count - 2);
    return mix(lw.gradient[idx].rgb, lw.gradient[idx + 1].rgb, pos - float(idx));
}

vec2 lw_rotate(vec2 v, float angle) {
    float s = sin(angle);
    float c = cos(angle);
    return vec2(v.x * c - v.y * s, v.x * s + v.y * c);
}

float lw_waveform(float x, float amplitude) {
    float t = lw.resolution.z;
    float y = sin(x * 0.3 + t * 0.5) * 0.3;
    y += sin(x * 0.7 - t * 0.3) * 0.15;
    y += sin(x * 1.1 + t * 0.7) * 0.1;
    return y * amplitude * 0.15;
}

float lw_bend(vec2 base_uv, vec2 pointer_uv) {
    float influence = lw.pointer.z;
    if (lw.pointer.w < 0.5 || influence <= 0.0) {
        return 0.0;
    }
    float dist = length(base_uv - pointer_uv);
    return smoothstep(lw.bend.x, 0.0, dist) * lw.bend.y * influence;
}

float lw_glow(float sample_y, float line_y) {
    return 0.0175 / max(abs(sample_y - line_y) + 0.01, 1e-3) + 0.01;
}

vec3 lw_band(int count, float spacing, vec3 position, float base_amp,
             float amp_step, float weight, bool mirrored, vec2 base_uv, float bend) {
    vec3 col = vec3(0.0);
    float angle = position.z * log(length(base_uv) + 1.0);
    vec2 ruv = lw_rotate(base_uv, angle);
    if (mirrored) {
        ruv.x = -ruv.x;
    }
    for (int i = 0; i < LW_MAX_LINES; ++i) {
        if (i >= count) {
            break;
        }
        float fi = float(i);
        float t = fi / max(float(count - 1), 1.0);
        vec2 p = ruv + vec2(spacing * fi + position.x, position.y);
        float line_y = lw_waveform(p.x, base_amp + amp_step * fi) + bend;
        col += lw_line_color(t) * lw_glow(p.y, line_y) * weight;
    }
    return col;
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 res = lw.resolution.xy;
    vec2 base_uv = (2.0 * fragCoord - res) / res.y;
    base_uv.y = -base_uv.y;
    if (lw.bend.z > 0.5) {
        base_uv += lw.parallax.xy;
    }

    vec2 pointer_uv = vec2(0.0);
    if (lw.pointer.w > 0.5) {
        pointer_uv = (2.0 * lw.pointer.xy - res) / res.y;
        pointer_uv.y = -pointer_uv.y;
    }
    float bend = lw_bend(base_uv, pointer_uv);

    vec3 col = vec3(0.0);
    if (lw.enabled.z != 0) {
        col += lw_band(lw.line_count.z, lw.line_distance.z, lw.band_position[2].xyz,
                       1.5, 0.2, 0.2, false, base_uv, bend);
    }
    if (lw.enabled.y != 0) {
        col += lw_band(lw.line_count.y, lw.line_distance.y, lw.band_position[1].xyz,
                       2.0, 0.15, 1.0, false, base_uv, bend);
    }
    if (lw.enabled.x != 0) {
        col += lw_band(lw.line_count.x, lw.line_distance.x, lw.band_position[0].xyz,
                       1.0, 0.2, 0.1, true, base_uv, bend);
    }
    fragColor = vec4(col, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_declares_every_uniform_field() {
        for field in [
            "resolution",
            "pointer",
            "bend",
            "parallax",
            "enabled",
            "line_count",
            "line_distance",
            "band_position[3]",
            "gradient[8]",
        ] {
            assert!(UNIFORM_BLOCK.contains(field), "missing {field}");
        }
        assert!(UNIFORM_BLOCK.contains(&format!("binding = {UNIFORM_BINDING}")));
    }

    #[test]
    fn kernel_exposes_main_image() {
        assert!(KERNEL.contains("void mainImage(out vec4 fragColor, in vec2 fragCoord)"));
        assert!(KERNEL.contains("LW_MAX_LINES = 30"));
    }
}
