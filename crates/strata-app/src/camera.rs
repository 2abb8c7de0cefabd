//! Free-flying first-person camera.
//!
//! Yaw/pitch orientation driven by relative mouse motion, translation along
//! the view basis from the movement axes. The projection is reverse-Z: near
//! and far swap places so depth precision concentrates where the geometry
//! is.

use glam::{Mat4, Vec3};

/// Near plane distance in world units.
const NEAR: f32 = 0.1;
/// Far plane distance in world units.
const FAR: f32 = 512.0;
/// Pitch limit just short of straight up/down, keeping the view basis
/// well-conditioned.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
/// Radians of rotation per mouse count at sensitivity 1.0.
const LOOK_SCALE: f32 = 0.002;

pub struct FlyCamera {
    pub position: Vec3,
    /// Radians around +Y; 0 looks down -Z.
    yaw: f32,
    /// Radians above the horizon, clamped to [`PITCH_LIMIT`].
    pitch: f32,
    fov_y: f32,
    aspect: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3, fov_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: fov_degrees.to_radians(),
            aspect,
            speed: 12.0,
            sensitivity: 1.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Applies relative mouse motion in window counts.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity * LOOK_SCALE;
        self.pitch = (self.pitch - dy * self.sensitivity * LOOK_SCALE)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves along the view basis: `axes.x` strafes, `axes.y` rises along
    /// world up, `axes.z` advances along the horizontal view direction.
    pub fn advance(&mut self, axes: Vec3, dt: f32) {
        let flat_forward = Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos());
        let right = flat_forward.cross(Vec3::Y);
        let motion = flat_forward * axes.z + right * axes.x + Vec3::Y * axes.y;
        if motion != Vec3::ZERO {
            self.position += motion.normalize() * self.speed * dt;
        }
    }

    /// View-projection matrix with reverse-Z projection (near and far
    /// swapped, matching the `GreaterEqual` depth test).
    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, FAR, NEAR);
        let view = Mat4::look_to_rh(self.position, self.forward(), Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let camera = FlyCamera::new(Vec3::ZERO, 70.0, 16.0 / 9.0);
        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_pitch_clamps_short_of_vertical() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 70.0, 1.0);
        camera.look(0.0, -100_000.0);
        assert!(camera.forward().y < 1.0);
        assert!(camera.forward().y > 0.99);
    }

    #[test]
    fn test_advance_ignores_pitch() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 70.0, 1.0);
        camera.look(0.0, -200.0);
        camera.advance(Vec3::new(0.0, 0.0, 1.0), 1.0);
        assert!(camera.position.y.abs() < 1e-6, "forward motion stays level");
        assert!(camera.position.z < 0.0);
    }

    #[test]
    fn test_reverse_z_maps_near_to_one() {
        let camera = FlyCamera::new(Vec3::ZERO, 70.0, 1.0);
        let vp = camera.view_proj();

        let near_point = vp * Vec3::new(0.0, 0.0, -NEAR).extend(1.0);
        let far_point = vp * Vec3::new(0.0, 0.0, -FAR).extend(1.0);
        let near_depth = near_point.z / near_point.w;
        let far_depth = far_point.z / far_point.w;

        assert!((near_depth - 1.0).abs() < 1e-4);
        assert!(far_depth.abs() < 1e-4);
    }

    #[test]
    fn test_zero_axes_do_not_move() {
        let mut camera = FlyCamera::new(Vec3::new(1.0, 2.0, 3.0), 70.0, 1.0);
        camera.advance(Vec3::ZERO, 1.0);
        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
