use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use treeline_common::MovementIntent;

/// Logical keys the controller understands. Hosts map physical keys
/// (WASD, arrows, space, shift) onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
}

/// Held keys for the current frame and the frame before it.
///
/// Owned by the host; there is no global key table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: BTreeSet<Key>,
    previous: BTreeSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Drop everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Down this frame, up the frame before.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.held.contains(&key) && !self.previous.contains(&key)
    }

    /// Roll this frame's keys into the previous-frame slot.
    pub fn end_frame(&mut self) {
        self.previous.clone_from(&self.held);
    }
}

/// Digital keyboard mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardIntent;

impl KeyboardIntent {
    /// Build the intent for this frame. Opposing keys cancel; diagonals are
    /// normalized by `MovementIntent::new`.
    pub fn sample(state: &InputState) -> MovementIntent {
        let axis_value = |neg: Key, pos: Key| -> f32 {
            match (state.is_held(neg), state.is_held(pos)) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        };
        let axis = Vec2::new(
            axis_value(Key::Left, Key::Right),
            axis_value(Key::Forward, Key::Backward),
        );
        MovementIntent::new(
            axis,
            state.just_pressed(Key::Jump),
            state.is_held(Key::Sprint),
        )
    }
}
