//! wgpu rendering for earthglow: device and surface setup, the viewport
//! controller, texture loading, and the pipelines that draw a [`Scene`].
//!
//! [`Scene`]: earthglow_scene::Scene

pub mod buffer;
pub mod depth;
pub mod gpu;
pub mod loader;
pub mod pass;
pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod starfield_pipeline;
pub mod texture;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

pub use buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};
pub use depth::{DepthBuffer, MsaaTarget};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use loader::{DecodedImage, TextureLoadResult, TextureLoader};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use pipeline::{
    ATMOSPHERE_SHADER_SOURCE, AtmospherePipeline, CameraUniform, GLOBE_SHADER_SOURCE,
    GlobePipeline, ObjectUniform, SharedLayouts,
};
pub use renderer::{RendererError, RendererSettings, SceneRenderer};
pub use shader::{ShaderError, ShaderLibrary};
pub use starfield_pipeline::{STARFIELD_SHADER_SOURCE, StarfieldPipeline, StarfieldUniform};
pub use texture::{ManagedTexture, TextureError, TextureManager};
pub use viewport::{PhysicalSize, Viewport, ViewportResize};
