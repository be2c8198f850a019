use std::fmt::Write;

use treeline_kernel::{BodySnapshot, CameraOrientation};

use crate::camera::{CameraPose, CameraRig};

/// Consumer of per-frame body state. Implemented by presentation backends.
///
/// A sink only ever sees copies; it cannot reach the simulation.
pub trait CameraSink {
    /// What presenting one frame produces.
    type Output;

    fn present(&mut self, body: &BodySnapshot, orientation: &CameraOrientation) -> Self::Output;
}

/// Text sink for the CLI and tests: one status line per frame.
#[derive(Debug, Default)]
pub struct DebugTextSink<R> {
    rig: R,
    frames: u64,
    last_pose: Option<CameraPose>,
}

impl<R: CameraRig> DebugTextSink<R> {
    pub fn new(rig: R) -> Self {
        Self {
            rig,
            frames: 0,
            last_pose: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_pose(&self) -> Option<&CameraPose> {
        self.last_pose.as_ref()
    }
}

impl<R: CameraRig> CameraSink for DebugTextSink<R> {
    type Output = String;

    fn present(&mut self, body: &BodySnapshot, orientation: &CameraOrientation) -> String {
        let pose = self.rig.pose(body, orientation);
        self.frames += 1;
        self.last_pose = Some(pose);

        let p = body.position;
        let v = body.velocity;
        let mut out = String::new();
        let _ = write!(
            out,
            "frame {:>5} pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) {}",
            self.frames,
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z,
            if body.on_ground { "ground" } else { "air" },
        );
        if body.is_sprinting {
            out.push_str(" sprint");
        }
        let _ = write!(
            out,
            " yaw={:.2} pitch={:.2} eye=({:.1}, {:.1}, {:.1})",
            orientation.yaw(),
            orientation.pitch(),
            pose.eye.x,
            pose.eye.y,
            pose.eye.z,
        );
        tracing::trace!(frame = self.frames, "presented");
        out
    }
}
