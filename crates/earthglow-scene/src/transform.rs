//! Position / Euler rotation / scale of a scene object.

use glam::{DMat4, DQuat, DVec3, EulerRot, Mat4};

/// Object transform in f64. Rotation is Euler angles in radians applied in
/// X, Y, Z order (intrinsic), so the model matrix is `T * Rx * Ry * Rz * S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        self.scale = DVec3::splat(scale);
        self
    }

    pub fn rotation_quat(&self) -> DQuat {
        DQuat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Model matrix, computed in f64 and narrowed for the GPU.
    pub fn model_matrix(&self) -> Mat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
            .as_mat4()
    }
}
