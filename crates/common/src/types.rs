use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Abstract movement request produced by the input collaborator once per tick.
///
/// `axis.x` strafes (right positive), `axis.y` walks with forward negative, so
/// pushing "forward" yields `axis.y == -1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementIntent {
    pub axis: Vec2,
    /// Single-tick pulse; true for exactly one tick per press.
    pub jump_requested: bool,
    /// Level-triggered; true while held.
    pub sprint: bool,
}

impl MovementIntent {
    /// No movement, no jump, no sprint.
    pub const IDLE: Self = Self {
        axis: Vec2::ZERO,
        jump_requested: false,
        sprint: false,
    };

    /// Build an intent, sanitizing the axis on the way in.
    pub fn new(axis: Vec2, jump_requested: bool, sprint: bool) -> Self {
        Self {
            axis: sanitize_axis(axis),
            jump_requested,
            sprint,
        }
    }

    /// Pure movement along an axis, nothing else.
    pub fn walk(axis: Vec2) -> Self {
        Self::new(axis, false, false)
    }

    /// The axis clamped to `[-1,1]²` and to the unit disk.
    ///
    /// NaN or infinite components collapse the whole axis to zero.
    pub fn sanitized_axis(&self) -> Vec2 {
        sanitize_axis(self.axis)
    }

    /// Whether the sanitized axis asks for any horizontal movement.
    pub fn is_moving(&self) -> bool {
        self.sanitized_axis() != Vec2::ZERO
    }
}

fn sanitize_axis(axis: Vec2) -> Vec2 {
    if !axis.is_finite() {
        return Vec2::ZERO;
    }
    axis.clamp(Vec2::NEG_ONE, Vec2::ONE).clamp_length_max(1.0)
}

/// Collision shape of a static obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Vertical cylinder (tree trunks, rocks). `position` is the base center.
    Cylinder { radius: f32, height: f32 },
    /// Axis-aligned box (cabins, platforms). `position` is the box center.
    Box { half_extents: Vec3 },
}

/// Static piece of world geometry the body collides against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub position: Vec3,
}

impl Obstacle {
    pub fn cylinder(base: Vec3, radius: f32, height: f32) -> Self {
        Self {
            shape: ObstacleShape::Cylinder { radius, height },
            position: base,
        }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            shape: ObstacleShape::Box { half_extents },
            position: center,
        }
    }

    /// Radius of the smallest vertical cylinder around `position` that
    /// contains the obstacle's horizontal footprint.
    pub fn horizontal_extent(&self) -> f32 {
        match self.shape {
            ObstacleShape::Cylinder { radius, .. } => radius,
            ObstacleShape::Box { half_extents } => half_extents.x.hypot(half_extents.z),
        }
    }

    /// Vertical span `(bottom, top)` in world space.
    pub fn vertical_span(&self) -> (f32, f32) {
        match self.shape {
            ObstacleShape::Cylinder { height, .. } => (self.position.y, self.position.y + height),
            ObstacleShape::Box { half_extents } => (
                self.position.y - half_extents.y,
                self.position.y + half_extents.y,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_axis_is_normalized() {
        let intent = MovementIntent::walk(Vec2::new(1.0, -1.0));
        assert!((intent.axis.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partial_axis_is_kept() {
        let intent = MovementIntent::walk(Vec2::new(0.3, 0.0));
        assert_eq!(intent.axis, Vec2::new(0.3, 0.0));
    }

    #[test]
    fn nan_axis_collapses_to_zero() {
        let intent = MovementIntent {
            axis: Vec2::new(f32::NAN, 1.0),
            ..MovementIntent::IDLE
        };
        assert_eq!(intent.sanitized_axis(), Vec2::ZERO);
        assert!(!intent.is_moving());
    }

    #[test]
    fn out_of_range_axis_is_clamped() {
        let intent = MovementIntent::walk(Vec2::new(5.0, 0.0));
        assert_eq!(intent.axis, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn box_extent_covers_corners() {
        let o = Obstacle::cuboid(Vec3::ZERO, Vec3::new(3.0, 1.0, 4.0));
        assert!((o.horizontal_extent() - 5.0).abs() < 1e-6);
        assert_eq!(o.vertical_span(), (-1.0, 1.0));
    }

    #[test]
    fn cylinder_span_starts_at_base() {
        let o = Obstacle::cylinder(Vec3::new(0.0, 2.0, 0.0), 0.5, 6.0);
        assert_eq!(o.vertical_span(), (2.0, 8.0));
        assert_eq!(o.horizontal_extent(), 0.5);
    }
}
