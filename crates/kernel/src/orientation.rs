use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Largest pitch magnitude; strictly below a quarter turn so the look vector
/// never becomes parallel to world up.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Yaw/pitch view orientation.
///
/// Axis convention: at `yaw == 0` the view looks down -Z, right is +X.
/// Movement uses only the yaw; pitch tilts the camera, never the walk plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraOrientation {
    yaw: f32,
    pitch: f32,
}

impl CameraOrientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        let mut o = Self { yaw: 0.0, pitch };
        o.set_yaw(yaw);
        o.clamp_pitch();
        o
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = if yaw.is_finite() { wrap_angle(yaw) } else { 0.0 };
    }

    /// Apply a pointer delta. Moving the pointer right turns the view right
    /// (yaw decreases); moving it down looks down (pitch decreases).
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        if !(dx.is_finite() && dy.is_finite() && sensitivity.is_finite()) {
            return;
        }
        self.set_yaw(self.yaw - dx * sensitivity);
        self.pitch -= dy * sensitivity;
        self.clamp_pitch();
    }

    pub fn clamp_pitch(&mut self) {
        self.pitch = if self.pitch.is_finite() {
            self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
        } else {
            0.0
        };
    }

    /// Horizontal unit vector the body walks along for "forward".
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal unit vector for "strafe right".
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Full look direction including pitch. Cameras only.
    pub fn look_direction(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-self.yaw.sin() * cp, sp, -self.yaw.cos() * cp)
    }
}

/// Wrap into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let o = CameraOrientation::default();
        assert!((o.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((o.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn pointer_right_turns_view_right() {
        let mut o = CameraOrientation::default();
        o.apply_pointer_delta(100.0, 0.0, 0.002);
        assert!(o.yaw() < 0.0);
        // Forward swings toward +X.
        assert!(o.forward().x > 0.0);
    }

    #[test]
    fn pointer_down_looks_down() {
        let mut o = CameraOrientation::default();
        o.apply_pointer_delta(0.0, 50.0, 0.002);
        assert!(o.pitch() < 0.0);
        assert!(o.look_direction().y < 0.0);
    }

    #[test]
    fn pitch_never_reaches_vertical() {
        let mut o = CameraOrientation::default();
        o.apply_pointer_delta(0.0, -1.0e6, 1.0);
        assert_eq!(o.pitch(), PITCH_LIMIT);
        assert!(o.pitch() < FRAC_PI_2);
        o.apply_pointer_delta(0.0, 1.0e6, 1.0);
        assert_eq!(o.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn forward_ignores_pitch() {
        let o = CameraOrientation::new(0.7, 1.2);
        assert_eq!(o.forward().y, 0.0);
        assert!((o.forward().length() - 1.0).abs() < 1e-6);
        assert!(o.forward().dot(o.right()).abs() < 1e-6);
    }

    #[test]
    fn yaw_wraps() {
        let o = CameraOrientation::new(3.0 * PI, 0.0);
        assert!(o.yaw() > -PI && o.yaw() <= PI);
        assert!((o.yaw().abs() - PI).abs() < 1e-4);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut o = CameraOrientation::new(0.5, 0.1);
        o.apply_pointer_delta(f32::NAN, 1.0, 0.002);
        assert_eq!(o, CameraOrientation::new(0.5, 0.1));
    }
}
