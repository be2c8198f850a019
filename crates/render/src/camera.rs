use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use treeline_kernel::{BodySnapshot, CameraOrientation};

/// Where the camera is and what it looks at for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
        }
    }
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 1000.0)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Unit vector from eye to target, or `-Z` if they coincide.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// Blend toward `goal`; `t = 0` keeps `self`, `t = 1` snaps.
    pub fn lerp(&self, goal: &CameraPose, t: f32) -> CameraPose {
        let t = t.clamp(0.0, 1.0);
        CameraPose {
            eye: self.eye.lerp(goal.eye, t),
            target: self.target.lerp(goal.target, t),
            fov_degrees: self.fov_degrees + (goal.fov_degrees - self.fov_degrees) * t,
        }
    }
}

/// Turns a body snapshot and view orientation into a camera pose.
pub trait CameraRig {
    fn pose(&self, body: &BodySnapshot, orientation: &CameraOrientation) -> CameraPose;
}

/// Third-person camera trailing the body.
///
/// The eye sits `distance` behind the body along the horizontal look
/// direction and `height` above its feet, aimed at `target_height` above the
/// feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowCamera {
    pub distance: f32,
    pub height: f32,
    pub target_height: f32,
    pub fov_degrees: f32,
    /// Exponential follow rate in 1/s; 0 snaps every frame.
    pub smoothing: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            distance: 5.0,
            height: 2.0,
            target_height: 1.0,
            fov_degrees: 75.0,
            smoothing: 0.0,
        }
    }
}

impl FollowCamera {
    /// Pose after `dt` seconds of easing from `previous` toward the ideal.
    pub fn follow(
        &self,
        previous: Option<&CameraPose>,
        body: &BodySnapshot,
        orientation: &CameraOrientation,
        dt: f32,
    ) -> CameraPose {
        let ideal = self.pose(body, orientation);
        match previous {
            Some(prev) if self.smoothing > 0.0 && dt.is_finite() && dt > 0.0 => {
                prev.lerp(&ideal, 1.0 - (-self.smoothing * dt).exp())
            }
            _ => ideal,
        }
    }
}

impl CameraRig for FollowCamera {
    fn pose(&self, body: &BodySnapshot, orientation: &CameraOrientation) -> CameraPose {
        let feet = body.position;
        CameraPose {
            eye: feet - orientation.forward() * self.distance + Vec3::Y * self.height,
            target: feet + Vec3::Y * self.target_height,
            fov_degrees: self.fov_degrees,
        }
    }
}

/// Eye placed inside the body, looking along the full pitched direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstPersonCamera {
    /// Eye height as a fraction of the body height.
    pub eye_fraction: f32,
    pub fov_degrees: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            eye_fraction: 0.9,
            fov_degrees: 75.0,
        }
    }
}

impl CameraRig for FirstPersonCamera {
    fn pose(&self, body: &BodySnapshot, orientation: &CameraOrientation) -> CameraPose {
        let eye = body.position + Vec3::Y * (body.height * self.eye_fraction);
        CameraPose {
            eye,
            target: eye + orientation.look_direction(),
            fov_degrees: self.fov_degrees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(position: Vec3) -> BodySnapshot {
        BodySnapshot {
            position,
            velocity: Vec3::ZERO,
            on_ground: true,
            is_sprinting: false,
            radius: 0.3,
            height: 1.7,
        }
    }

    #[test]
    fn follow_sits_behind_the_body() {
        let cam = FollowCamera::default();
        let pose = cam.pose(&body_at(Vec3::ZERO), &CameraOrientation::default());
        // Looking down -Z, so the camera trails on +Z.
        assert!((pose.eye - Vec3::new(0.0, 2.0, 5.0)).length() < 1e-5);
        assert_eq!(pose.target, Vec3::new(0.0, 1.0, 0.0));
        assert!(pose.direction().z < 0.0);
    }

    #[test]
    fn follow_swings_with_yaw_not_pitch() {
        let cam = FollowCamera::default();
        let body = body_at(Vec3::new(3.0, 1.0, -2.0));
        let level = cam.pose(&body, &CameraOrientation::new(1.0, 0.0));
        let tilted = cam.pose(&body, &CameraOrientation::new(1.0, 0.8));
        assert_eq!(level, tilted);
        let horizontal = (level.eye - body.position).with_y(0.0).length();
        assert!((horizontal - cam.distance).abs() < 1e-5);
    }

    #[test]
    fn smoothing_eases_toward_ideal() {
        let cam = FollowCamera {
            smoothing: 5.0,
            ..FollowCamera::default()
        };
        let orientation = CameraOrientation::default();
        let start = cam.pose(&body_at(Vec3::ZERO), &orientation);
        let moved = body_at(Vec3::new(10.0, 0.0, 0.0));
        let ideal = cam.pose(&moved, &orientation);

        let eased = cam.follow(Some(&start), &moved, &orientation, 1.0 / 60.0);
        assert!(eased.eye.x > start.eye.x && eased.eye.x < ideal.eye.x);

        let snapped = FollowCamera::default().follow(Some(&start), &moved, &orientation, 1.0 / 60.0);
        assert_eq!(snapped, ideal);
        assert_eq!(cam.follow(None, &moved, &orientation, 1.0 / 60.0), ideal);
    }

    #[test]
    fn first_person_looks_along_pitch() {
        let cam = FirstPersonCamera::default();
        let orientation = CameraOrientation::new(0.0, -0.5);
        let pose = cam.pose(&body_at(Vec3::ZERO), &orientation);
        assert!((pose.eye.y - 1.53).abs() < 1e-5);
        assert!(pose.direction().y < 0.0);
        assert!((pose.direction() - orientation.look_direction()).length() < 1e-5);
    }

    #[test]
    fn matrices_are_finite() {
        let pose = FollowCamera::default().pose(&body_at(Vec3::ZERO), &CameraOrientation::default());
        assert!(pose.view_projection(16.0 / 9.0).is_finite());
    }
}
