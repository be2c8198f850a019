//! Controller kernel: fixed-step character movement, ground contact, collision
//! resolution against static obstacles, deterministic replay hooks.
//!
//! # Invariants
//! - A tick is a pure function of body state, intent, orientation, terrain and dt.
//! - After every tick the body's feet are at or above the terrain.
//! - Only the tick mutates `KinematicBody`; everything else reads snapshots.

pub mod accumulator;
pub mod body;
pub mod clock;
pub mod controller;
pub mod orientation;
pub mod resolver;
pub mod simulation;
pub mod terrain;

pub use accumulator::{FixedStepAccumulator, StepBudget};
pub use body::{BodySnapshot, KinematicBody};
pub use clock::{FrameClock, InstantClock};
pub use controller::{desired_horizontal_velocity, step_body, TickReport};
pub use orientation::CameraOrientation;
pub use resolver::{CollisionResolver, CollisionResult, ResolvePhase};
pub use simulation::{InputFrame, SimEvent, Simulation};
pub use terrain::{sample_ground, TerrainQuery, FLAT_FALLBACK_HEIGHT};
