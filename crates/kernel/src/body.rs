use glam::Vec3;
use serde::{Deserialize, Serialize};
use treeline_common::{ConfigError, ControllerConfig};

/// The controlled character: a vertical cylinder anchored at its feet.
///
/// Plain data. The fixed tick (`step_body`) is the only writer; render and
/// camera code take a `BodySnapshot` instead of borrowing the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Lowest point of the body in world space.
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    /// True while a jump may launch; cleared on launch and re-armed only
    /// after a grounded tick with the jump input released.
    pub jump_armed: bool,
    pub is_sprinting: bool,
    radius: f32,
    height: f32,
    spawn: Vec3,
}

impl KinematicBody {
    /// Create a body resting (or hanging) at `spawn`.
    pub fn new(spawn: Vec3, radius: f32, height: f32) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "body_radius",
                value: radius,
            });
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "body_height",
                value: height,
            });
        }
        if !spawn.is_finite() {
            return Err(ConfigError::NonFiniteSpawn);
        }
        Ok(Self {
            position: spawn,
            velocity: Vec3::ZERO,
            on_ground: false,
            jump_armed: false,
            is_sprinting: false,
            radius,
            height,
            spawn,
        })
    }

    pub fn from_config(spawn: Vec3, config: &ControllerConfig) -> Result<Self, ConfigError> {
        Self::new(spawn, config.body_radius, config.body_height)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    /// Highest point of the body.
    pub fn top(&self) -> f32 {
        self.position.y + self.height
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.x.hypot(self.velocity.z)
    }

    /// Put the body back at its spawn pose with the initial flags.
    pub fn respawn(&mut self) {
        self.position = self.spawn;
        self.velocity = Vec3::ZERO;
        self.on_ground = false;
        self.jump_armed = false;
        self.is_sprinting = false;
    }

    /// Copy of the observable state, safe to hand to render code.
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
            on_ground: self.on_ground,
            is_sprinting: self.is_sprinting,
            radius: self.radius,
            height: self.height,
        }
    }
}

/// Read-only copy of a body between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub is_sprinting: bool,
    pub radius: f32,
    pub height: f32,
}
