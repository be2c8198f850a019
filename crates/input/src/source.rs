use treeline_common::MovementIntent;

use crate::keys::{InputState, KeyboardIntent};
use crate::touch::VirtualJoystick;

/// Anything that can report the current frame's movement intent.
///
/// `sample_intent` must be side-effect free: calling it twice within a frame
/// yields the same intent.
pub trait IntentSource {
    fn sample_intent(&self) -> MovementIntent;
}

impl IntentSource for InputState {
    fn sample_intent(&self) -> MovementIntent {
        KeyboardIntent::sample(self)
    }
}

impl IntentSource for VirtualJoystick {
    fn sample_intent(&self) -> MovementIntent {
        self.intent()
    }
}

impl<S: IntentSource + ?Sized> IntentSource for &S {
    fn sample_intent(&self) -> MovementIntent {
        (**self).sample_intent()
    }
}

/// A fixed sequence of intents, one per frame. Idle once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIntent {
    script: Vec<MovementIntent>,
    cursor: usize,
}

impl ScriptedIntent {
    pub fn new(script: Vec<MovementIntent>) -> Self {
        Self { script, cursor: 0 }
    }

    /// `intent` repeated for `frames` frames.
    pub fn repeat(intent: MovementIntent, frames: usize) -> Self {
        Self::new(vec![intent; frames])
    }

    /// Append `intent` for `frames` more frames.
    pub fn then(mut self, intent: MovementIntent, frames: usize) -> Self {
        self.script.extend(std::iter::repeat_n(intent, frames));
        self
    }

    /// Move to the next frame's intent.
    pub fn advance(&mut self) {
        if self.cursor < self.script.len() {
            self.cursor += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.script.len()
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl IntentSource for ScriptedIntent {
    fn sample_intent(&self) -> MovementIntent {
        self.script
            .get(self.cursor)
            .copied()
            .unwrap_or(MovementIntent::IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use glam::Vec2;

    #[test]
    fn script_plays_in_order_then_idles() {
        let walk = MovementIntent::walk(Vec2::new(0.0, -1.0));
        let jump = MovementIntent::new(Vec2::ZERO, true, false);
        let mut script = ScriptedIntent::repeat(walk, 2).then(jump, 1);
        assert_eq!(script.len(), 3);

        assert_eq!(script.sample_intent(), walk);
        assert_eq!(script.sample_intent(), walk);
        script.advance();
        assert_eq!(script.sample_intent(), walk);
        script.advance();
        assert_eq!(script.sample_intent(), jump);
        script.advance();
        assert!(script.is_finished());
        assert_eq!(script.sample_intent(), MovementIntent::IDLE);
        script.advance();
        assert_eq!(script.sample_intent(), MovementIntent::IDLE);
    }

    #[test]
    fn sources_work_behind_dyn() {
        let mut keys = InputState::new();
        keys.press(Key::Backward);
        let sources: Vec<Box<dyn IntentSource>> = vec![
            Box::new(keys),
            Box::new(ScriptedIntent::default()),
            Box::new(VirtualJoystick::default()),
        ];
        let axes: Vec<Vec2> = sources.iter().map(|s| s.sample_intent().axis).collect();
        assert_eq!(axes, vec![Vec2::new(0.0, 1.0), Vec2::ZERO, Vec2::ZERO]);
    }
}
