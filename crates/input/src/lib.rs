//! Input collaborator: device state in, `MovementIntent` out.
//!
//! # Invariants
//! - The controller never sees raw device events, only intents.
//! - `jump_requested` is a single-frame pulse: true on the frame the jump key
//!   goes down, false while it stays held.
//! - Sampling an intent never mutates input state; frames advance only
//!   through `end_frame`.

pub mod keys;
pub mod look;
pub mod source;
pub mod touch;

pub use keys::{InputState, Key, KeyboardIntent};
pub use look::PointerLook;
pub use source::{IntentSource, ScriptedIntent};
pub use touch::VirtualJoystick;
