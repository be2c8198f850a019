//! Shared types for the treeline character controller.
//!
//! # Invariants
//! - Value types only; nothing here mutates simulation state.
//! - A `ControllerConfig` that passed `validate()` is safe to tick with.

pub mod config;
pub mod types;

pub use config::{ConfigError, ControllerConfig};
pub use types::{MovementIntent, Obstacle, ObstacleShape};

pub fn crate_info() -> &'static str {
    "treeline-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
