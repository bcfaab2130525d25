//! The fixed object graph: five textured bodies, an atmosphere shell and
//! the starfield, plus the camera that views them.

use glam::DVec3;

use crate::camera::PerspectiveCamera;
use crate::geometry::SphereGeometry;
use crate::material::Material;
use crate::starfield::Starfield;
use crate::transform::Transform;

/// Tessellation of every textured body.
pub const BODY_SEGMENTS: u32 = 64;
/// Tessellation of the atmosphere shell.
pub const ATMOSPHERE_SEGMENTS: u32 = 60;
/// The shell is the Earth sphere scaled up by this factor.
pub const ATMOSPHERE_SCALE: f64 = 1.2;

pub const CAMERA_FOV_DEGREES: f64 = 75.0;
pub const CAMERA_NEAR: f64 = 0.1;
pub const CAMERA_FAR: f64 = 1000.0;
pub const CAMERA_POSITION: DVec3 = DVec3::new(0.0, 0.0, 3.3);

/// Clear colour `#1A2025` as sRGB bytes.
pub const BACKGROUND_SRGB: [u8; 3] = [0x1A, 0x20, 0x25];

/// Identifies one of the six renderable bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Sphere,
    Moon,
    Planet1,
    Planet2,
    Planet3,
    Atmosphere,
}

impl BodyKind {
    /// Draw order: opaque bodies first, the additive shell last.
    pub const ALL: [BodyKind; 6] = [
        BodyKind::Sphere,
        BodyKind::Moon,
        BodyKind::Planet1,
        BodyKind::Planet2,
        BodyKind::Planet3,
        BodyKind::Atmosphere,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BodyKind::Sphere => "sphere",
            BodyKind::Moon => "moon",
            BodyKind::Planet1 => "planet1",
            BodyKind::Planet2 => "planet2",
            BodyKind::Planet3 => "planet3",
            BodyKind::Atmosphere => "atmosphere",
        }
    }

    fn radius(self) -> f32 {
        match self {
            BodyKind::Sphere | BodyKind::Atmosphere => 0.9,
            BodyKind::Moon => 0.3,
            BodyKind::Planet1 | BodyKind::Planet3 => 7.0,
            BodyKind::Planet2 => 1.7,
        }
    }

    fn initial_transform(self) -> Transform {
        match self {
            BodyKind::Sphere => Transform::default(),
            BodyKind::Moon => Transform::from_position(DVec3::new(-1.5, 0.7, 0.0)),
            BodyKind::Planet1 => Transform::from_position(DVec3::new(65.0, 20.0, -75.0)),
            BodyKind::Planet2 => Transform::from_position(DVec3::new(-24.0, -15.0, -25.0)),
            BodyKind::Planet3 => Transform::from_position(DVec3::new(40.0, -35.0, -60.0)),
            BodyKind::Atmosphere => Transform::default().with_uniform_scale(ATMOSPHERE_SCALE),
        }
    }

    // "MoodUV.jpg" is the shipped asset name for the moon.
    fn material(self) -> Material {
        match self {
            BodyKind::Sphere => Material::Surface {
                texture: "EarthUV.jpg",
            },
            BodyKind::Moon => Material::Surface {
                texture: "MoodUV.jpg",
            },
            BodyKind::Planet1 => Material::Surface {
                texture: "JupiterUV.jpg",
            },
            BodyKind::Planet2 => Material::Surface {
                texture: "MarsUV.jpg",
            },
            BodyKind::Planet3 => Material::Surface {
                texture: "NeptuneUV.jpg",
            },
            BodyKind::Atmosphere => Material::Atmosphere,
        }
    }

    fn geometry(self) -> SphereGeometry {
        let segments = match self {
            BodyKind::Atmosphere => ATMOSPHERE_SEGMENTS,
            _ => BODY_SEGMENTS,
        };
        SphereGeometry::new(self.radius(), segments, segments)
    }
}

/// A sphere with a material and a transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub geometry: SphereGeometry,
    pub material: Material,
    pub transform: Transform,
}

impl Body {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            geometry: kind.geometry(),
            material: kind.material(),
            transform: kind.initial_transform(),
        }
    }
}

/// The whole scene. Object count is fixed; fields are named so the
/// animation can address each body directly.
#[derive(Clone, Debug)]
pub struct Scene {
    pub sphere: Body,
    pub moon: Body,
    pub planet1: Body,
    pub planet2: Body,
    pub planet3: Body,
    pub atmosphere: Body,
    pub starfield: Starfield,
    pub background: [u8; 3],
}

impl Scene {
    /// All bodies in draw order.
    pub fn bodies(&self) -> [&Body; 6] {
        [
            &self.sphere,
            &self.moon,
            &self.planet1,
            &self.planet2,
            &self.planet3,
            &self.atmosphere,
        ]
    }

    pub fn body(&self, kind: BodyKind) -> &Body {
        match kind {
            BodyKind::Sphere => &self.sphere,
            BodyKind::Moon => &self.moon,
            BodyKind::Planet1 => &self.planet1,
            BodyKind::Planet2 => &self.planet2,
            BodyKind::Planet3 => &self.planet3,
            BodyKind::Atmosphere => &self.atmosphere,
        }
    }

    /// Background in linear RGB, for clearing an sRGB target.
    pub fn background_linear(&self) -> [f64; 3] {
        self.background.map(|c| srgb_to_linear(c as f64 / 255.0))
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Assembles the scene and its camera.
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    seed: Option<u64>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the starfield layout. `None` keeps it random per launch.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self, aspect: f64) -> (Scene, PerspectiveCamera) {
        let starfield = Starfield::from_seed(self.seed);
        log::info!(
            "Built scene: {} bodies, {} stars (seed {:?})",
            BodyKind::ALL.len(),
            starfield.len(),
            self.seed
        );

        let scene = Scene {
            sphere: Body::new(BodyKind::Sphere),
            moon: Body::new(BodyKind::Moon),
            planet1: Body::new(BodyKind::Planet1),
            planet2: Body::new(BodyKind::Planet2),
            planet3: Body::new(BodyKind::Planet3),
            atmosphere: Body::new(BodyKind::Atmosphere),
            starfield,
            background: BACKGROUND_SRGB,
        };

        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, aspect, CAMERA_NEAR, CAMERA_FAR);
        camera.position = CAMERA_POSITION;

        (scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::BlendMode;

    fn scene() -> Scene {
        SceneBuilder::new().with_seed(Some(7)).build(1.5).0
    }

    #[test]
    fn test_six_bodies_in_draw_order() {
        let scene = scene();
        let kinds: Vec<BodyKind> = scene.bodies().iter().map(|b| b.kind).collect();
        assert_eq!(kinds, BodyKind::ALL.to_vec());
        assert_eq!(scene.bodies().last().unwrap().material.blend(), BlendMode::Additive);
    }

    #[test]
    fn test_body_radii() {
        let scene = scene();
        let radii: Vec<f32> = scene.bodies().iter().map(|b| b.geometry.radius).collect();
        assert_eq!(radii, vec![0.9, 0.3, 7.0, 1.7, 7.0, 0.9]);
    }

    #[test]
    fn test_tessellation() {
        let scene = scene();
        assert_eq!(scene.sphere.geometry.width_segments, 64);
        assert_eq!(scene.planet3.geometry.height_segments, 64);
        assert_eq!(scene.atmosphere.geometry.width_segments, 60);
    }

    #[test]
    fn test_initial_transforms() {
        let scene = scene();
        assert_eq!(scene.moon.transform.position, DVec3::new(-1.5, 0.7, 0.0));
        assert_eq!(scene.planet1.transform.position, DVec3::new(65.0, 20.0, -75.0));
        assert_eq!(scene.planet2.transform.position, DVec3::new(-24.0, -15.0, -25.0));
        assert_eq!(scene.planet3.transform.position, DVec3::new(40.0, -35.0, -60.0));
        assert_eq!(scene.atmosphere.transform.scale, DVec3::splat(1.2));
        for body in scene.bodies() {
            assert_eq!(body.transform.rotation, DVec3::ZERO);
        }
    }

    #[test]
    fn test_texture_names() {
        let scene = scene();
        let textures: Vec<Option<&str>> =
            scene.bodies().iter().map(|b| b.material.texture()).collect();
        assert_eq!(
            textures,
            vec![
                Some("EarthUV.jpg"),
                Some("MoodUV.jpg"),
                Some("JupiterUV.jpg"),
                Some("MarsUV.jpg"),
                Some("NeptuneUV.jpg"),
                None,
            ]
        );
    }

    #[test]
    fn test_camera_setup() {
        let (_, camera) = SceneBuilder::new().with_seed(Some(1)).build(800.0 / 600.0);
        assert_eq!(camera.fov_y_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, DVec3::new(0.0, 0.0, 3.3));
        assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_body_lookup_matches_fields() {
        let scene = scene();
        for kind in BodyKind::ALL {
            assert_eq!(scene.body(kind).kind, kind);
        }
    }

    #[test]
    fn test_background_linearised() {
        let linear = scene().background_linear();
        // 0x1A = 26 -> ~0.0103 linear
        assert!((linear[0] - 0.0103).abs() < 1e-3);
        assert!(linear[2] > linear[1] && linear[1] > linear[0]);
    }
}
