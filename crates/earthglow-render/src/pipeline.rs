//! Pipelines for the sphere bodies: the textured globe shader shared by the
//! planets, and the additive back-face atmosphere shell.
//!
//! Bind groups: 0 = camera, 1 = per-object model matrix, 2 = texture.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use earthglow_scene::{BlendMode, PerspectiveCamera, Side, Transform};

use crate::buffer::VertexPositionNormalUv;
use crate::depth::DepthBuffer;

/// View-projection and view matrices, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            model: transform.model_matrix().to_cols_array_2d(),
        }
    }
}

/// Bind group layouts for the camera and object uniforms, shared by every
/// scene pipeline.
pub struct SharedLayouts {
    pub camera: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
}

impl SharedLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            camera: uniform_layout(
                device,
                "camera-bind-group-layout",
                std::mem::size_of::<CameraUniform>() as u64,
                wgpu::ShaderStages::VERTEX,
            ),
            object: uniform_layout(
                device,
                "object-bind-group-layout",
                std::mem::size_of::<ObjectUniform>() as u64,
                wgpu::ShaderStages::VERTEX,
            ),
        }
    }

    /// Bind a whole uniform buffer at binding 0 of `layout`.
    pub fn bind_uniform(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

pub(crate) fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

/// Colour blend state for a material blend mode. Additive matches
/// `src * src_alpha + dst` on both colour and alpha.
pub fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    match mode {
        BlendMode::Normal => None,
        BlendMode::Additive => {
            let component = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            Some(wgpu::BlendState {
                color: component,
                alpha: component,
            })
        }
    }
}

/// Faces to discard so that only `side` is rasterised.
pub fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
    }
}

/// Inputs shared by the sphere pipelines.
pub(crate) struct SpherePipelineDesc<'a> {
    pub label: &'a str,
    pub shader: &'a wgpu::ShaderModule,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub surface_format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub blend: BlendMode,
    pub side: Side,
}

fn create_sphere_pipeline(
    device: &wgpu::Device,
    desc: &SpherePipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}-layout", desc.label)),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(desc.side),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthBuffer::stencil_state()),
        multisample: wgpu::MultisampleState {
            count: desc.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.surface_format,
                blend: blend_state(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// Textured sphere with a rim glow. Used for the globe, the moon and the
/// planets.
pub struct GlobePipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl GlobePipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layouts: &SharedLayouts,
        texture_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let pipeline = create_sphere_pipeline(
            device,
            &SpherePipelineDesc {
                label: "globe-pipeline",
                shader,
                bind_group_layouts: &[&layouts.camera, &layouts.object, texture_layout],
                surface_format,
                sample_count,
                blend: BlendMode::Normal,
                side: Side::Front,
            },
        );
        Self { pipeline }
    }

    pub fn draw<'a>(
        &self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        object_bind_group: &'a wgpu::BindGroup,
        texture_bind_group: &'a wgpu::BindGroup,
        mesh: &'a crate::buffer::MeshBuffer,
    ) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, object_bind_group, &[]);
        render_pass.set_bind_group(2, texture_bind_group, &[]);
        mesh.bind(render_pass);
        mesh.draw(render_pass);
    }
}

/// Inside-out additive glow around the globe.
pub struct AtmospherePipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl AtmospherePipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layouts: &SharedLayouts,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let pipeline = create_sphere_pipeline(
            device,
            &SpherePipelineDesc {
                label: "atmosphere-pipeline",
                shader,
                bind_group_layouts: &[&layouts.camera, &layouts.object],
                surface_format,
                sample_count,
                blend: BlendMode::Additive,
                side: Side::Back,
            },
        );
        Self { pipeline }
    }

    pub fn draw<'a>(
        &self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        object_bind_group: &'a wgpu::BindGroup,
        mesh: &'a crate::buffer::MeshBuffer,
    ) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, object_bind_group, &[]);
        mesh.bind(render_pass);
        mesh.draw(render_pass);
    }
}

/// Surface colour is `texture + (0.3, 0.6, 1.0) * (1.05 - n.z)^1.5`, with
/// `n` the view-space normal. The sum is computed on display values and
/// converted to linear for the sRGB target.
pub const GLOBE_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

struct ObjectUniform {
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> body: ObjectUniform;

@group(2) @binding(0)
var t_surface: texture_2d<f32>;
@group(2) @binding(1)
var s_surface: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

fn display_to_linear(c: vec3<f32>) -> vec3<f32> {
    let v = clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
    let low = v / 12.92;
    let high = pow((v + 0.055) / 1.055, vec3<f32>(2.4));
    return select(high, low, v <= vec3<f32>(0.04045));
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * body.model * vec4<f32>(in.position, 1.0);
    out.view_normal = (camera.view * body.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.view_normal);
    let intensity = max(1.05 - dot(n, vec3<f32>(0.0, 0.0, 1.0)), 0.0);
    let rim = vec3<f32>(0.3, 0.6, 1.0) * pow(intensity, 1.5);
    // Texture values are display-referred (uploaded as Unorm, not sRGB).
    let base = textureSample(t_surface, s_surface, in.uv).rgb;
    return vec4<f32>(display_to_linear(base + rim), 1.0);
}
"#;

/// Glow is `(0.3, 0.6, 1.0, 1.0) * (0.75 - n.z)^2`, blended additively.
pub const ATMOSPHERE_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

struct ObjectUniform {
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> body: ObjectUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
};

fn display_to_linear(c: vec3<f32>) -> vec3<f32> {
    let v = clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
    let low = v / 12.92;
    let high = pow((v + 0.055) / 1.055, vec3<f32>(2.4));
    return select(high, low, v <= vec3<f32>(0.04045));
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * body.model * vec4<f32>(in.position, 1.0);
    out.view_normal = (camera.view * body.model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.view_normal);
    let intensity = pow(max(0.75 - dot(n, vec3<f32>(0.0, 0.0, 1.0)), 0.0), 2.0);
    let glow = vec4<f32>(0.3, 0.6, 1.0, 1.0) * intensity;
    return vec4<f32>(display_to_linear(glow.rgb), clamp(glow.a, 0.0, 1.0));
}
"#;
