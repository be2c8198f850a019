use glam::Vec2;
use treeline_common::MovementIntent;

/// Default knob travel in pixels.
pub const DEFAULT_MAX_DISTANCE: f32 = 35.0;
/// Default per-axis dead zone on the normalized stick.
pub const DEFAULT_DEAD_ZONE: f32 = 0.1;

/// On-screen touch stick plus a jump button.
///
/// Screen y grows downward, so dragging up yields a negative axis, which is
/// already "forward" in intent space.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualJoystick {
    center: Vec2,
    knob: Option<Vec2>,
    max_distance: f32,
    dead_zone: f32,
    jump_tapped: bool,
}

impl Default for VirtualJoystick {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE, DEFAULT_DEAD_ZONE)
    }
}

impl VirtualJoystick {
    pub fn new(max_distance: f32, dead_zone: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            knob: None,
            max_distance: max_distance.max(f32::EPSILON),
            dead_zone: dead_zone.clamp(0.0, 1.0),
            jump_tapped: false,
        }
    }

    /// A finger landed on the stick whose center is at `center`.
    pub fn touch_start(&mut self, center: Vec2, touch: Vec2) {
        self.center = center;
        self.knob = Some(Vec2::ZERO);
        self.touch_move(touch);
    }

    pub fn touch_move(&mut self, touch: Vec2) {
        if self.knob.is_none() || !touch.is_finite() {
            return;
        }
        self.knob = Some((touch - self.center).clamp_length_max(self.max_distance));
    }

    /// Finger lifted or touch cancelled; the stick recenters.
    pub fn touch_end(&mut self) {
        self.knob = None;
    }

    pub fn is_active(&self) -> bool {
        self.knob.is_some()
    }

    /// Knob offset in pixels, for drawing.
    pub fn knob_offset(&self) -> Vec2 {
        self.knob.unwrap_or(Vec2::ZERO)
    }

    /// Normalized stick position with the dead zone applied per axis.
    pub fn axis(&self) -> Vec2 {
        let raw = self.knob_offset() / self.max_distance;
        let dead = |c: f32| if c.abs() < self.dead_zone { 0.0 } else { c };
        Vec2::new(dead(raw.x), dead(raw.y)).clamp_length_max(1.0)
    }

    /// The jump button was touched this frame.
    pub fn tap_jump(&mut self) {
        self.jump_tapped = true;
    }

    /// Clear single-frame pulses.
    pub fn end_frame(&mut self) {
        self.jump_tapped = false;
    }

    pub fn intent(&self) -> MovementIntent {
        MovementIntent::new(self.axis(), self.jump_tapped, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick() -> VirtualJoystick {
        VirtualJoystick::default()
    }

    #[test]
    fn drag_up_is_forward() {
        let mut s = stick();
        s.touch_start(Vec2::new(100.0, 100.0), Vec2::new(100.0, 65.0));
        assert_eq!(s.axis(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn travel_is_clamped_to_unit_disk() {
        let mut s = stick();
        s.touch_start(Vec2::ZERO, Vec2::new(300.0, 400.0));
        assert!((s.knob_offset().length() - DEFAULT_MAX_DISTANCE).abs() < 1e-4);
        assert!((s.axis().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn small_offsets_fall_in_dead_zone() {
        let mut s = stick();
        s.touch_start(Vec2::ZERO, Vec2::new(2.0, -3.0));
        assert_eq!(s.axis(), Vec2::ZERO);

        s.touch_move(Vec2::new(2.0, -20.0));
        let axis = s.axis();
        assert_eq!(axis.x, 0.0);
        assert!(axis.y < -0.5);
    }

    #[test]
    fn release_recenters() {
        let mut s = stick();
        s.touch_start(Vec2::ZERO, Vec2::new(30.0, 0.0));
        s.touch_end();
        assert!(!s.is_active());
        assert_eq!(s.axis(), Vec2::ZERO);
        // Moves without an active touch are ignored.
        s.touch_move(Vec2::new(30.0, 0.0));
        assert_eq!(s.axis(), Vec2::ZERO);
    }

    #[test]
    fn jump_tap_lasts_one_frame() {
        let mut s = stick();
        s.tap_jump();
        assert!(s.intent().jump_requested);
        s.end_frame();
        assert!(!s.intent().jump_requested);
    }
}
