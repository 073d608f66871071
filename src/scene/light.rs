//! Light sources.
//!
//! A [`Light`] carries the fields every light shares plus a [`LightKind`]
//! payload. Renderer code dispatches on the kind tag; there is no trait
//! object and no downcasting.

use glam::{Mat4, Vec3};
use smallvec::SmallVec;

/// Near plane shared by every shadow projection.
pub const SHADOW_NEAR_PLANE: f32 = 1.0;
/// Far plane of the directional orthographic shadow projection.
pub const DIRECTIONAL_FAR_PLANE: f32 = 7.5;
/// Half extent of the directional orthographic shadow projection.
pub const DIRECTIONAL_HALF_EXTENT: f32 = 10.0;
/// Far plane of spot shadow projections.
pub const SPOT_FAR_PLANE: f32 = 25.0;

/// Light type tag used when creating lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Directional => "Directional Light",
            Self::Point => "Point Light",
            Self::Spot => "Spot Light",
        }
    }
}

/// Distance attenuation `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    #[must_use]
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Type-specific light payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        attenuation: Attenuation,
        far_plane: f32,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        attenuation: Attenuation,
        /// Cosine of the inner cone half-angle.
        cut_off: f32,
        /// Cosine of the outer cone half-angle.
        outer_cut_off: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    /// Controls the gizmo only; hidden lights still illuminate the scene.
    pub visible: bool,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub kind: LightKind,
}

impl Light {
    /// Creates a light of `light_type` with the editor's default parameters.
    #[must_use]
    pub fn new(light_type: LightType) -> Self {
        match light_type {
            LightType::Directional => Self {
                name: String::new(),
                visible: true,
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::ONE,
                kind: LightKind::Directional {
                    direction: Vec3::new(-0.2, -1.0, -0.3),
                },
            },
            LightType::Point => Self {
                name: String::new(),
                visible: true,
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::ONE,
                kind: LightKind::Point {
                    position: Vec3::new(0.0, 1.0, 0.0),
                    attenuation: Attenuation::default(),
                    far_plane: 25.0,
                },
            },
            LightType::Spot => Self {
                name: String::new(),
                visible: true,
                ambient: Vec3::splat(0.1),
                diffuse: Vec3::splat(0.8),
                specular: Vec3::ONE,
                kind: LightKind::Spot {
                    position: Vec3::new(0.0, 0.0, -1.0),
                    direction: Vec3::new(0.0, 0.0, 1.0),
                    attenuation: Attenuation::default(),
                    cut_off: 12.5_f32.to_radians().cos(),
                    outer_cut_off: 17.5_f32.to_radians().cos(),
                },
            },
        }
    }

    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional { .. } => LightType::Directional,
            LightKind::Point { .. } => LightType::Point,
            LightKind::Spot { .. } => LightType::Spot,
        }
    }

    /// World position; `None` for directional lights.
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => Some(position),
        }
    }

    /// Moves a positional light. Directional lights are left untouched.
    pub fn set_position(&mut self, new_position: Vec3) {
        match &mut self.kind {
            LightKind::Directional { .. } => {}
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => {
                *position = new_position;
            }
        }
    }

    /// Light-space (projection · view) matrices used by the shadow pass.
    ///
    /// One matrix for directional and spot lights, six for point lights in
    /// +X, -X, +Y, -Y, +Z, -Z face order.
    #[must_use]
    pub fn light_space_matrices(&self) -> SmallVec<[Mat4; 6]> {
        match self.kind {
            LightKind::Directional { direction } => {
                let e = DIRECTIONAL_HALF_EXTENT;
                let proj =
                    Mat4::orthographic_rh(-e, e, -e, e, SHADOW_NEAR_PLANE, DIRECTIONAL_FAR_PLANE);
                let eye = -direction;
                let view = Mat4::look_at_rh(eye, Vec3::ZERO, stable_up(direction));
                smallvec::smallvec![proj * view]
            }
            LightKind::Point {
                position,
                far_plane,
                ..
            } => point_face_matrices(position, far_plane),
            LightKind::Spot {
                position,
                direction,
                cut_off,
                ..
            } => {
                let fov = 2.0 * cut_off.clamp(-1.0, 1.0).acos();
                let proj = Mat4::perspective_rh(
                    fov.max(1e-3),
                    1.0,
                    SHADOW_NEAR_PLANE,
                    SPOT_FAR_PLANE,
                );
                let view = Mat4::look_at_rh(position, position + direction, stable_up(direction));
                smallvec::smallvec![proj * view]
            }
        }
    }

    /// Inner cone half-angle in degrees (spot lights only).
    #[must_use]
    pub fn cut_off_degrees(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { cut_off, .. } => Some(cut_off.acos().to_degrees()),
            _ => None,
        }
    }

    /// Outer cone half-angle in degrees (spot lights only).
    #[must_use]
    pub fn outer_cut_off_degrees(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { outer_cut_off, .. } => Some(outer_cut_off.acos().to_degrees()),
            _ => None,
        }
    }

    pub fn set_cut_off_degrees(&mut self, degrees: f32) {
        if let LightKind::Spot { cut_off, .. } = &mut self.kind {
            *cut_off = degrees.clamp(0.0, 89.0).to_radians().cos();
        }
    }

    pub fn set_outer_cut_off_degrees(&mut self, degrees: f32) {
        if let LightKind::Spot { outer_cut_off, .. } = &mut self.kind {
            *outer_cut_off = degrees.clamp(0.0, 89.0).to_radians().cos();
        }
    }
}

/// View directions and up vectors of the six cube faces.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

fn point_face_matrices(position: Vec3, far_plane: f32) -> SmallVec<[Mat4; 6]> {
    let proj = Mat4::perspective_rh(
        90.0_f32.to_radians(),
        1.0,
        SHADOW_NEAR_PLANE,
        far_plane.max(SHADOW_NEAR_PLANE + 1e-3),
    );
    CUBE_FACES
        .iter()
        .map(|&(dir, up)| proj * Mat4::look_at_rh(position, position + dir, up))
        .collect()
}

/// +Y unless `direction` is (nearly) vertical, then +X.
fn stable_up(direction: Vec3) -> Vec3 {
    if direction.normalize_or(Vec3::NEG_Y).abs().y > 0.999 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_count_depends_on_kind() {
        assert_eq!(Light::new(LightType::Directional).light_space_matrices().len(), 1);
        assert_eq!(Light::new(LightType::Point).light_space_matrices().len(), 6);
        assert_eq!(Light::new(LightType::Spot).light_space_matrices().len(), 1);
    }

    #[test]
    fn spot_cut_offs_round_trip_in_degrees() {
        let mut spot = Light::new(LightType::Spot);
        assert!((spot.cut_off_degrees().unwrap() - 12.5).abs() < 1e-3);
        spot.set_outer_cut_off_degrees(30.0);
        assert!((spot.outer_cut_off_degrees().unwrap() - 30.0).abs() < 1e-3);
        assert!(Light::new(LightType::Point).cut_off_degrees().is_none());
    }

    #[test]
    fn attenuation_is_one_at_the_light() {
        assert!((Attenuation::default().factor(0.0) - 1.0).abs() < 1e-6);
    }
}
