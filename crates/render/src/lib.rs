//! Presentation side of the controller: camera rigs and sinks.
//!
//! # Invariants
//! - Cameras read `BodySnapshot` copies and never touch the body.
//! - Camera sync runs once per rendered frame, outside the fixed tick.
//!
//! A GPU backend plugs in as another `CameraSink`; the debug text sink is
//! what the CLI and tests use.

mod camera;
mod sink;

pub use camera::{CameraPose, CameraRig, FirstPersonCamera, FollowCamera};
pub use sink::{CameraSink, DebugTextSink};
