use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::types::SurfaceAlpha;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the line-wave kernel as a GLSL fragment shader.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    surface_alpha: SurfaceAlpha,
) -> wgpu::ShaderModule {
    let source = wrap_kernel(surface_alpha);
    tracing::trace!(bytes = source.len(), "compiling line-wave fragment shader");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("line-wave fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Produces a self-contained fragment shader: [`HEADER`], the uniform block
/// and kernel from `linewave::shader`, then the entry point.
fn wrap_kernel(surface_alpha: SurfaceAlpha) -> String {
    let footer = match surface_alpha {
        SurfaceAlpha::Opaque => FOOTER_OPAQUE,
        SurfaceAlpha::Transparent => FOOTER_TRANSPARENT,
    };
    format!(
        "{HEADER}{block}{kernel}{footer}",
        block = linewave::shader::UNIFORM_BLOCK,
        kernel = linewave::shader::KERNEL,
    )
}

const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;
";

// Kernel coordinates come from v_uv (bottom-left origin) scaled to the
// backing resolution, which may be smaller than the swapchain.
const FOOTER_OPAQUE: &str = r"
void main() {
    vec2 fragCoord = v_uv * lw.resolution.xy;
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = vec4(color.rgb, 1.0);
}
";

const FOOTER_TRANSPARENT: &str = r"
void main() {
    vec2 fragCoord = v_uv * lw.resolution.xy;
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    vec3 rgb = clamp(color.rgb, 0.0, 1.0);
    float alpha = max(rgb.r, max(rgb.g, rgb.b));
    outColor = vec4(rgb, alpha);
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
