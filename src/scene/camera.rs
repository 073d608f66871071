use glam::{Mat4, Quat, Vec3};

/// Minimum vertical field of view in degrees.
pub const MIN_ZOOM: f32 = 1.0;
/// Maximum (and default) vertical field of view in degrees.
pub const MAX_ZOOM: f32 = 45.0;

/// Fly-camera movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person fly camera.
///
/// Orientation is kept as a `front` vector rotated with quaternions, so the
/// camera never accumulates Euler-angle drift.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    /// Vertical field of view in degrees, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    zoom: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Units per second.
    pub speed: f32,
    /// Pixels of mouse travel per radian of rotation.
    pub sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), 16.0 / 9.0)
    }
}

impl Camera {
    #[must_use]
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let mut cam = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            zoom: MAX_ZOOM,
            aspect,
            near: 0.1,
            far: 100.0,
            speed: 2.5,
            sensitivity: 200.0,
        };
        cam.update_basis();
        cam
    }

    #[inline]
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Points the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.front = (target - self.position).normalize_or(self.front);
        self.update_basis();
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Moves along the view basis. `fast` doubles the speed.
    pub fn process_movement(&mut self, direction: CameraMovement, fast: bool, dt: f32) {
        let velocity = self.speed * dt * if fast { 2.0 } else { 1.0 };
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Yaws about world up, then pitches about the camera's right axis.
    ///
    /// Offsets are in pixels; positive `dx` turns right, positive `dy` looks down.
    pub fn process_rotation(&mut self, dx: f32, dy: f32) {
        let yaw = Quat::from_axis_angle(self.world_up, -dx / self.sensitivity);
        let front = yaw * self.front;

        let right = front.cross(self.world_up).normalize_or(self.right);
        let pitch = Quat::from_axis_angle(right, -dy / self.sensitivity);
        let pitched = pitch * front;

        // Refuse pitches that would flip over the pole.
        self.front = if pitched.dot(self.world_up).abs() < 0.995 {
            pitched.normalize()
        } else {
            front.normalize()
        };
        self.update_basis();
    }

    /// Scroll-wheel zoom: positive `delta` narrows the field of view.
    pub fn process_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    fn update_basis(&mut self) {
        self.right = self.front.cross(self.world_up).normalize_or(Vec3::X);
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.process_zoom(100.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.process_zoom(-100.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
    }

    #[test]
    fn view_looks_down_front() {
        let cam = Camera::default();
        // The origin sits straight ahead, 3 units down -Z in view space.
        let p = cam.view().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
    }

    #[test]
    fn ctrl_doubles_speed() {
        let mut a = Camera::default();
        let mut b = Camera::default();
        a.process_movement(CameraMovement::Forward, false, 1.0);
        b.process_movement(CameraMovement::Forward, true, 1.0);
        assert!(((b.position.z - 3.0) - 2.0 * (a.position.z - 3.0)).abs() < 1e-5);
    }

    #[test]
    fn pitch_never_flips_over_the_pole() {
        let mut cam = Camera::default();
        for _ in 0..100 {
            cam.process_rotation(0.0, -200.0);
        }
        assert!(cam.front().dot(Vec3::Y) < 0.9999);
    }
}
