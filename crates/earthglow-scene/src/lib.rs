//! Scene content for earthglow: the fixed set of bodies, the starfield, the
//! camera, and the per-frame animation rules that move them.
//!
//! Everything here is CPU-side and GPU-agnostic. `earthglow-render` turns a
//! [`Scene`] into draw calls.

pub mod animation;
pub mod camera;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod starfield;
pub mod transform;

pub use animation::{FrameContext, animate};
pub use camera::PerspectiveCamera;
pub use geometry::{MeshData, SphereGeometry};
pub use material::{BlendMode, Material, PointMaterial, Side};
pub use scene::{Body, BodyKind, Scene, SceneBuilder};
pub use starfield::Starfield;
pub use transform::Transform;
