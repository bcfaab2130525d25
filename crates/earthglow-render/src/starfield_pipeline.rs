//! Starfield drawn as camera-facing square quads, one instance per star.
//!
//! Point size attenuates with distance: `size * (buffer_height / 2) / w`
//! pixels, never below [`MIN_POINT_PIXELS`].

use bytemuck::{Pod, Zeroable};
use earthglow_scene::{BlendMode, Starfield};

use crate::depth::DepthBuffer;
use crate::pipeline::{SharedLayouts, blend_state, uniform_layout};
use crate::viewport::PhysicalSize;

/// Smallest rasterised star, in physical pixels.
pub const MIN_POINT_PIXELS: f32 = 1.0;

/// Vertices per star quad (two triangles).
pub const VERTICES_PER_STAR: u32 = 6;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarfieldUniform {
    pub model: [[f32; 4]; 4],
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
    /// `(size, buffer_width, buffer_height, min_pixels)`.
    pub params: [f32; 4],
}

impl StarfieldUniform {
    pub fn new(starfield: &Starfield, buffer: PhysicalSize) -> Self {
        let [r, g, b] = starfield.material.color;
        Self {
            model: starfield.transform.model_matrix().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            params: [
                starfield.material.size,
                buffer.width as f32,
                buffer.height as f32,
                MIN_POINT_PIXELS,
            ],
        }
    }
}

/// Per-instance star centre.
pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

pub struct StarfieldPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Layout for group 1 (the [`StarfieldUniform`]).
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl StarfieldPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layouts: &SharedLayouts,
        blend: BlendMode,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let uniform_layout = uniform_layout(
            device,
            "starfield-bind-group-layout",
            std::mem::size_of::<StarfieldUniform>() as u64,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&layouts.camera, &uniform_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[instance_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state()),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: blend_state(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_layout,
        }
    }

    pub fn draw<'a>(
        &self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        starfield_bind_group: &'a wgpu::BindGroup,
        instances: &'a wgpu::Buffer,
        star_count: u32,
    ) {
        if star_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, starfield_bind_group, &[]);
        render_pass.set_vertex_buffer(0, instances.slice(..));
        render_pass.draw(0..VERTICES_PER_STAR, 0..star_count);
    }
}

/// Screen-space pixel size of a star at clip-space `w`.
pub fn point_size_pixels(size: f32, buffer_height: f32, clip_w: f32) -> f32 {
    (size * buffer_height * 0.5 / clip_w).max(MIN_POINT_PIXELS)
}

pub const STARFIELD_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

struct StarfieldUniform {
    model: mat4x4<f32>,
    color: vec4<f32>,
    // size, buffer width, buffer height, min pixels
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> stars: StarfieldUniform;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32, @location(0) center: vec3<f32>) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );

    var clip = camera.view_proj * stars.model * vec4<f32>(center, 1.0);
    let pixels = max(stars.params.x * stars.params.z * 0.5 / clip.w, stars.params.w);
    let viewport = stars.params.yz;
    clip = vec4<f32>(clip.xy + corners[idx] * pixels / viewport * clip.w, clip.zw);

    var out: VertexOutput;
    out.clip_position = clip;
    return out;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return stars.color;
}
"#;
