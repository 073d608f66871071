use glam::{Mat4, Quat, Vec3};

/// Position / Euler rotation / scale triple.
///
/// Rotation is stored in degrees, the unit the editor exposes. The rotation
/// quaternion is `normalize(Qz · Qy · Qx)`, so X is applied first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_rotation_degrees(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation quaternion built from the Euler angles.
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        let r = self.rotation * (std::f32::consts::PI / 180.0);
        (Quat::from_rotation_z(r.z) * Quat::from_rotation_y(r.y) * Quat::from_rotation_x(r.x))
            .normalize()
    }

    /// `T · R · S`
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_about_z_maps_x_to_y() {
        let t = Transform::IDENTITY.with_rotation_degrees(Vec3::new(0.0, 0.0, 90.0));
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn x_rotation_is_applied_before_z() {
        // X first: +Y -> +Z, then Z leaves +Z alone.
        let t = Transform::IDENTITY.with_rotation_degrees(Vec3::new(90.0, 0.0, 90.0));
        let p = t.matrix().transform_vector3(Vec3::Y);
        assert!((p - Vec3::Z).length() < 1e-5, "got {p}");
    }
}
