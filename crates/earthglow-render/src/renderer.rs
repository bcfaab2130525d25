//! Owns every GPU resource for a [`Scene`] and records one pass per frame.
//!
//! Draw order is the textured bodies, then the starfield, then the
//! atmosphere shell, so additive glow lands on top of the stars behind it.

use std::path::PathBuf;
use std::sync::Arc;

use bytemuck::Zeroable;
use earthglow_scene::{BodyKind, PerspectiveCamera, Scene};

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::depth::{DepthBuffer, MsaaTarget};
use crate::gpu::{RenderContext, SurfaceError};
use crate::loader::TextureLoader;
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::pipeline::{
    ATMOSPHERE_SHADER_SOURCE, AtmospherePipeline, CameraUniform, GLOBE_SHADER_SOURCE,
    GlobePipeline, ObjectUniform, SharedLayouts,
};
use crate::shader::{ShaderError, ShaderLibrary};
use crate::starfield_pipeline::{STARFIELD_SHADER_SOURCE, StarfieldPipeline, StarfieldUniform};
use crate::texture::{ManagedTexture, TextureError, TextureManager};
use crate::viewport::{PhysicalSize, Viewport};

/// Background decode threads for planet textures.
const TEXTURE_DECODE_WORKERS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct RendererSettings {
    /// Directory the planet textures are read from.
    pub asset_dir: PathBuf,
    /// Optional directory of `.wgsl` overrides.
    pub shader_dir: Option<PathBuf>,
    /// Requested MSAA sample count; lowered to what the adapter supports.
    pub msaa_samples: u32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            shader_dir: None,
            msaa_samples: 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("shader error: {0}")]
    Shader(#[from] ShaderError),

    #[error("texture error: {0}")]
    Texture(#[from] TextureError),
}

struct BodyResources {
    kind: BodyKind,
    texture_name: Option<&'static str>,
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: Arc<ManagedTexture>,
}

pub struct SceneRenderer {
    globe: GlobePipeline,
    atmosphere: AtmospherePipeline,
    starfield: StarfieldPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    bodies: Vec<BodyResources>,
    star_instances: wgpu::Buffer,
    star_count: u32,
    star_uniform_buffer: wgpu::Buffer,
    star_bind_group: wgpu::BindGroup,
    textures: TextureManager,
    loader: TextureLoader,
    depth: DepthBuffer,
    msaa: Option<MsaaTarget>,
    sample_count: u32,
}

impl SceneRenderer {
    /// Build pipelines and upload geometry for `scene`. Planet textures are
    /// requested from background workers; until each arrives its body
    /// samples a black placeholder.
    pub fn new(
        ctx: &RenderContext,
        scene: &Scene,
        settings: RendererSettings,
    ) -> Result<Self, RendererError> {
        let device = &ctx.device;
        let sample_count = ctx.supported_sample_count(settings.msaa_samples);
        if sample_count != settings.msaa_samples {
            log::warn!(
                "MSAA x{} not supported for {:?}, using x{}",
                settings.msaa_samples,
                ctx.surface_format,
                sample_count
            );
        }

        let mut shaders = match &settings.shader_dir {
            Some(dir) => ShaderLibrary::new().with_shader_dir(dir),
            None => ShaderLibrary::new(),
        };
        let globe_shader =
            shaders.load_or_builtin(device, "globe", "globe.wgsl", GLOBE_SHADER_SOURCE)?;
        let atmosphere_shader = shaders.load_or_builtin(
            device,
            "atmosphere",
            "atmosphere.wgsl",
            ATMOSPHERE_SHADER_SOURCE,
        )?;
        let starfield_shader = shaders.load_or_builtin(
            device,
            "starfield",
            "starfield.wgsl",
            STARFIELD_SHADER_SOURCE,
        )?;

        let layouts = SharedLayouts::new(device);
        let mut textures = TextureManager::new(device);
        let placeholder = textures.placeholder(device, &ctx.queue)?;

        let globe = GlobePipeline::new(
            device,
            &globe_shader,
            &layouts,
            textures.bind_group_layout(),
            ctx.surface_format,
            sample_count,
        );
        let atmosphere = AtmospherePipeline::new(
            device,
            &atmosphere_shader,
            &layouts,
            ctx.surface_format,
            sample_count,
        );
        let starfield = StarfieldPipeline::new(
            device,
            &starfield_shader,
            &layouts,
            scene.starfield.material.blend,
            ctx.surface_format,
            sample_count,
        );

        let allocator = BufferAllocator::new(device);
        let camera_buffer = allocator.create_uniform_buffer(
            "camera-uniform",
            bytemuck::bytes_of(&CameraUniform::zeroed()),
        );
        let camera_bind_group = SharedLayouts::bind_uniform(
            device,
            "camera-bind-group",
            &layouts.camera,
            &camera_buffer,
        );

        let loader = TextureLoader::new(
            TEXTURE_DECODE_WORKERS,
            device.limits().max_texture_dimension_2d,
        );
        let mut bodies = Vec::with_capacity(BodyKind::ALL.len());
        for body in scene.bodies() {
            let label = body.kind.label();
            let mesh = allocator.create_sphere_mesh(label, &body.geometry.build());
            let uniform_buffer = allocator.create_uniform_buffer(
                &format!("{label}-uniform"),
                bytemuck::bytes_of(&ObjectUniform::from_transform(&body.transform)),
            );
            let bind_group = SharedLayouts::bind_uniform(
                device,
                &format!("{label}-bind-group"),
                &layouts.object,
                &uniform_buffer,
            );

            let texture_name = body.material.texture();
            if let Some(name) = texture_name {
                loader.request(name, settings.asset_dir.join(name));
            }

            bodies.push(BodyResources {
                kind: body.kind,
                texture_name,
                mesh,
                uniform_buffer,
                bind_group,
                texture: Arc::clone(&placeholder),
            });
        }

        let star_instances = allocator.create_instance_buffer(
            "starfield-instances",
            bytemuck::cast_slice(scene.starfield.points()),
        );
        let (width, height) = ctx.surface_size();
        let star_uniform_buffer = allocator.create_uniform_buffer(
            "starfield-uniform",
            bytemuck::bytes_of(&StarfieldUniform::new(
                &scene.starfield,
                PhysicalSize { width, height },
            )),
        );
        let star_bind_group = SharedLayouts::bind_uniform(
            device,
            "starfield-bind-group",
            &starfield.uniform_layout,
            &star_uniform_buffer,
        );

        let depth = DepthBuffer::new(device, width, height, sample_count);
        let msaa = (sample_count > 1).then(|| {
            MsaaTarget::new(device, ctx.surface_format, width, height, sample_count)
        });

        log::info!(
            "Scene renderer ready: {} bodies, {} stars, MSAA x{}",
            bodies.len(),
            scene.starfield.len(),
            sample_count
        );

        Ok(Self {
            globe,
            atmosphere,
            starfield,
            camera_buffer,
            camera_bind_group,
            bodies,
            star_instances,
            star_count: scene.starfield.len() as u32,
            star_uniform_buffer,
            star_bind_group,
            textures,
            loader,
            depth,
            msaa,
            sample_count,
        })
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Textures still being decoded.
    pub fn pending_textures(&self) -> usize {
        self.loader.pending()
    }

    /// Resize depth and MSAA targets. The surface itself is reconfigured by
    /// [`RenderContext::resize`].
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize) {
        self.depth.resize(device, size.width, size.height);
        if let Some(msaa) = &mut self.msaa {
            msaa.resize(device, size.width, size.height);
        }
    }

    /// Upload any textures that finished decoding. Returns how many bodies
    /// switched from the placeholder. A failed load leaves the placeholder
    /// in place.
    pub fn poll_textures(&mut self, ctx: &RenderContext) -> usize {
        let mut swapped = 0;
        for result in self.loader.drain_results() {
            let image = match result.image {
                Ok(image) => image,
                Err(err) => {
                    log::warn!(
                        "Texture '{}' failed to load from {}: {err}",
                        result.name,
                        result.path.display()
                    );
                    continue;
                }
            };

            let texture =
                match self
                    .textures
                    .upload_image(&ctx.device, &ctx.queue, &result.name, &image)
                {
                    Ok(texture) => texture,
                    Err(err) => {
                        log::warn!("Texture '{}' rejected: {err}", result.name);
                        continue;
                    }
                };

            for body in &mut self.bodies {
                if body.texture_name == Some(result.name.as_str()) {
                    body.texture = Arc::clone(&texture);
                    swapped += 1;
                }
            }
        }
        swapped
    }

    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        scene: &Scene,
        camera: &PerspectiveCamera,
        viewport: &Viewport,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
        for body in &self.bodies {
            let transform = &scene.body(body.kind).transform;
            queue.write_buffer(
                &body.uniform_buffer,
                0,
                bytemuck::bytes_of(&ObjectUniform::from_transform(transform)),
            );
        }
        queue.write_buffer(
            &self.star_uniform_buffer,
            0,
            bytemuck::bytes_of(&StarfieldUniform::new(
                &scene.starfield,
                viewport.drawing_buffer_size(),
            )),
        );
    }

    /// Draw one frame of `scene` as seen from `camera`.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        scene: &Scene,
        camera: &PerspectiveCamera,
        viewport: &Viewport,
    ) -> Result<(), SurfaceError> {
        self.write_uniforms(&ctx.queue, scene, camera, viewport);

        let surface_texture = ctx.get_current_texture()?;
        let mut frame = FrameEncoder::new(&ctx.device, &ctx.queue, surface_texture);

        let [r, g, b] = scene.background_linear();
        let mut builder = RenderPassBuilder::new()
            .label("scene-pass")
            .clear_color(wgpu::Color { r, g, b, a: 1.0 })
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE);
        if let Some(msaa) = &self.msaa {
            builder = builder.msaa(msaa.view.clone());
        }

        if let Some(mut pass) = frame.begin_render_pass(&builder) {
            for body in self.bodies.iter().filter(|b| b.kind != BodyKind::Atmosphere) {
                self.globe.draw(
                    &mut pass,
                    &self.camera_bind_group,
                    &body.bind_group,
                    &body.texture.bind_group,
                    &body.mesh,
                );
            }

            self.starfield.draw(
                &mut pass,
                &self.camera_bind_group,
                &self.star_bind_group,
                &self.star_instances,
                self.star_count,
            );

            for body in self.bodies.iter().filter(|b| b.kind == BodyKind::Atmosphere) {
                self.atmosphere
                    .draw(&mut pass, &self.camera_bind_group, &body.bind_group, &body.mesh);
            }
        }

        frame.submit();
        Ok(())
    }
}
