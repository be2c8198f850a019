use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from building or loading a controller configuration.
///
/// Any of these means the tick loop must not be entered.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must lie in {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f32,
    },
    #[error("sprint_speed ({sprint}) is below walk_speed ({walk})")]
    SprintSlowerThanWalk { walk: f32, sprint: f32 },
    #[error("max_ticks_per_frame must be at least 1")]
    ZeroTickCap,
    #[error("spawn position must be finite")]
    NonFiniteSpawn,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Tuning knobs for the fixed-step controller.
///
/// Missing fields in a YAML file fall back to the defaults below, which match
/// the forest-explorer feel (g = 20, walk 5, sprint 8, jump 8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub fixed_step_seconds: f32,
    /// Frame deltas above this are clamped before reaching the accumulator.
    pub max_frame_delta: f32,
    /// Catch-up ticks per frame; the rest of the frame's time is dropped.
    pub max_ticks_per_frame: u32,
    pub gravity: f32,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub jump_force: f32,
    /// Per-tick horizontal velocity retention while grounded, in `[0, 1)`.
    pub ground_friction: f32,
    /// Per-tick horizontal velocity retention while airborne, in `[0, 1]`.
    pub air_friction: f32,
    pub ground_contact_epsilon: f32,
    /// Bodies whose feet drop below this height are respawned.
    pub respawn_threshold: f32,
    pub body_radius: f32,
    pub body_height: f32,
    pub mouse_sensitivity: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fixed_step_seconds: 1.0 / 60.0,
            max_frame_delta: 0.1,
            max_ticks_per_frame: 10,
            gravity: 20.0,
            walk_speed: 5.0,
            sprint_speed: 8.0,
            jump_force: 8.0,
            ground_friction: 0.8,
            air_friction: 0.98,
            ground_contact_epsilon: 0.1,
            respawn_threshold: -20.0,
            body_radius: 0.3,
            body_height: 1.7,
            mouse_sensitivity: 0.002,
        }
    }
}

impl ControllerConfig {
    /// Check every parameter the tick loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fixed_step_seconds", self.fixed_step_seconds)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        positive("body_radius", self.body_radius)?;
        positive("body_height", self.body_height)?;
        positive("ground_contact_epsilon", self.ground_contact_epsilon)?;
        positive("mouse_sensitivity", self.mouse_sensitivity)?;
        non_negative("gravity", self.gravity)?;
        non_negative("walk_speed", self.walk_speed)?;
        non_negative("sprint_speed", self.sprint_speed)?;
        non_negative("jump_force", self.jump_force)?;

        if !(0.0..1.0).contains(&self.ground_friction) {
            return Err(ConfigError::OutOfRange {
                field: "ground_friction",
                range: "[0, 1)",
                value: self.ground_friction,
            });
        }
        if !(0.0..=1.0).contains(&self.air_friction) {
            return Err(ConfigError::OutOfRange {
                field: "air_friction",
                range: "[0, 1]",
                value: self.air_friction,
            });
        }
        if !self.respawn_threshold.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "respawn_threshold",
                range: "finite values",
                value: self.respawn_threshold,
            });
        }
        if self.sprint_speed < self.walk_speed {
            return Err(ConfigError::SprintSlowerThanWalk {
                walk: self.walk_speed,
                sprint: self.sprint_speed,
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::ZeroTickCap);
        }
        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Airtime of a jump from flat ground: `2 * jump_force / gravity`.
    pub fn jump_airtime(&self) -> f32 {
        if self.gravity > 0.0 {
            2.0 * self.jump_force / self.gravity
        } else {
            f32::INFINITY
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
