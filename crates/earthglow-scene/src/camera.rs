//! Perspective camera with a reverse-Z projection.

use glam::{DMat4, DVec3, Mat4};

/// Fixed-orientation perspective camera looking down -Z.
///
/// Only the aspect ratio changes after construction. The projection maps
/// the near plane to depth 1 and the far plane to depth 0, so depth testing
/// uses `GreaterEqual` and clears to 0.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: DVec3::ZERO,
        }
    }

    /// Set the aspect ratio from a viewport size. A zero height would divide
    /// by zero, so it yields 1.0.
    pub fn set_aspect_ratio(&mut self, width: f64, height: f64) {
        self.aspect = if height > 0.0 { width / height } else { 1.0 };
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_f64().as_mat4()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_f64().as_mat4()
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        (self.projection_f64() * self.view_f64()).as_mat4()
    }

    fn view_f64(&self) -> DMat4 {
        DMat4::from_translation(-self.position)
    }

    fn projection_f64(&self) -> DMat4 {
        // Near and far swapped for reverse-Z.
        DMat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.far,
            self.near,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 800.0 / 600.0, 0.1, 1000.0);
        camera.position = DVec3::new(0.0, 0.0, 3.3);
        camera
    }

    fn ndc_depth(camera: &PerspectiveCamera, z: f32) -> f32 {
        let clip = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn test_reverse_z_near_plane_is_one() {
        let depth = ndc_depth(&camera(), 3.3 - 0.1);
        assert!((depth - 1.0).abs() < 1e-4, "near depth {depth}");
    }

    #[test]
    fn test_reverse_z_far_plane_is_zero() {
        let depth = ndc_depth(&camera(), 3.3 - 1000.0);
        assert!(depth.abs() < 1e-4, "far depth {depth}");
    }

    #[test]
    fn test_closer_points_have_greater_depth() {
        let camera = camera();
        assert!(ndc_depth(&camera, 0.0) > ndc_depth(&camera, -60.0));
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = camera();
        camera.set_aspect_ratio(1600.0, 900.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_height_aspect_is_one() {
        let mut camera = camera();
        camera.set_aspect_ratio(1024.0, 0.0);
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_view_moves_world_opposite_to_camera() {
        let view = camera().view_matrix();
        let p = view.transform_point3(glam::Vec3::ZERO);
        assert!((p.z + 3.3).abs() < 1e-6);
    }
}
