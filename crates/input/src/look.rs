use glam::Vec2;
use treeline_kernel::CameraOrientation;

/// Pointer motion accumulated between ticks.
///
/// Relative mouse events can arrive many times per frame; they are summed
/// here and applied to the orientation once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerLook {
    pending: Vec2,
}

impl PointerLook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw pointer delta in pixels. Non-finite deltas are dropped.
    pub fn push(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.pending += Vec2::new(dx, dy);
        } else {
            tracing::trace!(dx, dy, "dropping non-finite pointer delta");
        }
    }

    pub fn pending(&self) -> Vec2 {
        self.pending
    }

    /// Take the accumulated delta, leaving zero behind.
    pub fn take(&mut self) -> Vec2 {
        std::mem::take(&mut self.pending)
    }

    /// Apply and clear the accumulated delta.
    pub fn drain_into(&mut self, orientation: &mut CameraOrientation, sensitivity: f32) {
        let delta = self.take();
        orientation.apply_pointer_delta(delta.x, delta.y, sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate_until_drained() {
        let mut look = PointerLook::new();
        look.push(10.0, 0.0);
        look.push(15.0, -5.0);
        assert_eq!(look.pending(), Vec2::new(25.0, -5.0));

        let mut orientation = CameraOrientation::default();
        look.drain_into(&mut orientation, 0.002);
        assert!((orientation.yaw() + 0.05).abs() < 1e-6);
        assert!((orientation.pitch() - 0.01).abs() < 1e-6);
        assert_eq!(look.pending(), Vec2::ZERO);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut look = PointerLook::new();
        look.push(f32::NAN, 1.0);
        look.push(f32::INFINITY, 0.0);
        assert_eq!(look.take(), Vec2::ZERO);
    }
}
