//! The fixed tick: intent + orientation in, committed body state out.

use glam::Vec3;
use treeline_common::{ControllerConfig, MovementIntent};

use crate::body::KinematicBody;
use crate::orientation::CameraOrientation;
use crate::resolver::CollisionResolver;
use crate::terrain::{sample_ground, TerrainQuery};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// Grounded this tick after being airborne.
    pub landed: bool,
    pub jumped: bool,
    /// Where the body was when it fell below the respawn threshold.
    pub respawned_from: Option<Vec3>,
    /// Obstacles that pushed the body this tick.
    pub contacts: usize,
}

/// World-space horizontal velocity the intent asks for, or `None` for no
/// movement. Diagonals never exceed the target speed.
pub fn desired_horizontal_velocity(
    intent: &MovementIntent,
    orientation: &CameraOrientation,
    config: &ControllerConfig,
) -> Option<Vec3> {
    let axis = intent.sanitized_axis();
    if axis == glam::Vec2::ZERO {
        return None;
    }
    let direction = (orientation.forward() * -axis.y + orientation.right() * axis.x)
        .try_normalize()?;
    let speed = if intent.sprint {
        config.sprint_speed
    } else {
        config.walk_speed
    };
    Some(direction * speed)
}

/// Advance `body` by one fixed step of `dt` seconds.
///
/// Order: horizontal velocity, gravity, jump, semi-implicit Euler, collision
/// resolution, commit, respawn. Never fails; missing terrain reads as flat.
pub fn step_body(
    body: &mut KinematicBody,
    intent: &MovementIntent,
    orientation: &CameraOrientation,
    config: &ControllerConfig,
    terrain: &(impl TerrainQuery + ?Sized),
    dt: f32,
) -> TickReport {
    let mut report = TickReport::default();
    let was_on_ground = body.on_ground;
    body.is_sprinting = intent.sprint;

    match desired_horizontal_velocity(intent, orientation, config) {
        Some(desired) => {
            body.velocity.x = desired.x;
            body.velocity.z = desired.z;
        }
        None => {
            let friction = if body.on_ground {
                config.ground_friction
            } else {
                config.air_friction
            };
            body.velocity.x *= friction;
            body.velocity.z *= friction;
        }
    }

    if !body.on_ground {
        body.velocity.y -= config.gravity * dt;
    }

    if intent.jump_requested && body.on_ground && body.jump_armed {
        body.velocity.y = config.jump_force;
        body.on_ground = false;
        body.jump_armed = false;
        report.jumped = true;
        tracing::debug!(position = ?body.position, "jump");
    }

    let candidate = body.position + body.velocity * dt;

    let resolver = CollisionResolver::new(body.radius(), body.height(), config.ground_contact_epsilon);
    let obstacles = terrain.obstacles_near(candidate, resolver.query_radius());
    let result = resolver.resolve_on(
        candidate,
        body.velocity,
        |x, z| sample_ground(terrain, x, z),
        &obstacles,
    );

    body.position = result.corrected_position;
    body.velocity -= result.velocity_correction;
    body.on_ground = result.on_ground;
    // Re-arm only once grounded with the button released: holding jump
    // through a landing must not bounce.
    body.jump_armed = body.on_ground && !intent.jump_requested;
    report.contacts = result.contacts;
    report.landed = body.on_ground && !was_on_ground && !report.jumped;

    if body.position.y < config.respawn_threshold {
        let fell_from = body.position;
        body.respawn();
        report.respawned_from = Some(fell_from);
        report.landed = false;
        tracing::info!(?fell_from, spawn = ?body.spawn(), "body fell out of the world, respawning");
    }

    report
}
