use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use treeline_common::{ConfigError, ControllerConfig, MovementIntent};

use crate::accumulator::{FixedStepAccumulator, StepBudget};
use crate::body::{BodySnapshot, KinematicBody};
use crate::controller::{step_body, TickReport};
use crate::orientation::CameraOrientation;
use crate::terrain::TerrainQuery;

/// Something observable that happened inside the tick loop.
///
/// The log is append-only; hosts drain it for HUDs, audio cues or tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// One fixed step completed.
    Ticked { tick: u64 },
    /// The body touched down after being airborne.
    Landed { tick: u64, position: Vec3 },
    Jumped { tick: u64, position: Vec3 },
    /// The body fell below the respawn threshold and was reset.
    Respawned { tick: u64, from: Vec3, to: Vec3 },
    /// A frame owed more ticks than the cap allows; `dropped` seconds were lost.
    StepOverload { tick: u64, dropped: f32 },
}

/// One rendered frame of host input: elapsed time, the sampled intent and
/// the pointer delta accumulated since the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub dt: f32,
    pub intent: MovementIntent,
    #[serde(default)]
    pub look: Vec2,
}

impl InputFrame {
    pub fn new(dt: f32, intent: MovementIntent) -> Self {
        Self {
            dt,
            intent,
            look: Vec2::ZERO,
        }
    }

    pub fn with_look(mut self, look: Vec2) -> Self {
        self.look = look;
        self
    }
}

/// The tick loop for one controlled body.
///
/// Owns every piece of mutable controller state. Given the same config,
/// spawn, terrain and input frames, two simulations produce bit-identical
/// states (see [`Simulation::state_hash`]).
#[derive(Debug)]
pub struct Simulation<T> {
    config: ControllerConfig,
    body: KinematicBody,
    orientation: CameraOrientation,
    accumulator: FixedStepAccumulator,
    terrain: T,
    tick: u64,
    /// A jump pulse that arrived on a frame which ran no ticks.
    pending_jump: bool,
    event_log: Vec<SimEvent>,
}

impl<T: TerrainQuery> Simulation<T> {
    /// Validate `config` and place a body at `spawn`. Nothing ticks until
    /// this succeeds.
    pub fn new(config: ControllerConfig, spawn: Vec3, terrain: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let body = KinematicBody::from_config(spawn, &config)?;
        let accumulator = FixedStepAccumulator::from_config(&config);
        tracing::debug!(?spawn, step = config.fixed_step_seconds, "simulation created");
        Ok(Self {
            config,
            body,
            orientation: CameraOrientation::default(),
            accumulator,
            terrain,
            tick: 0,
            pending_jump: false,
            event_log: Vec::new(),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn snapshot(&self) -> BodySnapshot {
        self.body.snapshot()
    }

    pub fn orientation(&self) -> &CameraOrientation {
        &self.orientation
    }

    pub fn set_orientation(&mut self, orientation: CameraOrientation) {
        self.orientation = orientation;
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Fraction of a step carried by the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator.alpha()
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Turn the view by a pointer delta using the configured sensitivity.
    pub fn look(&mut self, delta: Vec2) {
        self.orientation
            .apply_pointer_delta(delta.x, delta.y, self.config.mouse_sensitivity);
    }

    /// Run exactly one fixed step.
    pub fn tick(&mut self, intent: &MovementIntent) -> TickReport {
        let _span = tracing::info_span!("sim_tick", tick = self.tick + 1).entered();
        let report = step_body(
            &mut self.body,
            intent,
            &self.orientation,
            &self.config,
            &self.terrain,
            self.config.fixed_step_seconds,
        );
        self.tick += 1;
        let tick = self.tick;

        if report.jumped {
            self.event_log.push(SimEvent::Jumped {
                tick,
                position: self.body.position,
            });
        }
        if report.landed {
            tracing::debug!(position = ?self.body.position, "landed");
            self.event_log.push(SimEvent::Landed {
                tick,
                position: self.body.position,
            });
        }
        if let Some(from) = report.respawned_from {
            self.event_log.push(SimEvent::Respawned {
                tick,
                from,
                to: self.body.spawn(),
            });
        }
        self.event_log.push(SimEvent::Ticked { tick });
        report
    }

    /// Feed one frame delta through the accumulator and run the ticks it owes.
    ///
    /// Every catch-up tick sees the same axis and sprint flag, but the jump
    /// pulse goes to the first tick only. A pulse on a frame that owes no
    /// ticks is held for the next tick that runs.
    pub fn advance_frame(&mut self, frame_delta: f32, intent: &MovementIntent) -> StepBudget {
        let budget = self.accumulator.advance(frame_delta);
        if budget.overloaded() {
            self.event_log.push(SimEvent::StepOverload {
                tick: self.tick,
                dropped: budget.dropped,
            });
        }

        let mut jump = intent.jump_requested || self.pending_jump;
        if budget.ticks == 0 {
            self.pending_jump = jump;
            return budget;
        }
        self.pending_jump = false;

        for _ in 0..budget.ticks {
            let this_tick = MovementIntent {
                jump_requested: jump,
                ..*intent
            };
            self.tick(&this_tick);
            jump = false;
        }
        budget
    }

    /// Apply a recorded frame: pointer look first, then the frame's ticks.
    pub fn apply_frame(&mut self, frame: &InputFrame) -> StepBudget {
        self.look(frame.look);
        self.advance_frame(frame.dt, &frame.intent)
    }

    /// Rebuild a simulation by running `frames` from a fresh spawn.
    pub fn replay(
        config: ControllerConfig,
        spawn: Vec3,
        terrain: T,
        frames: &[InputFrame],
    ) -> Result<Self, ConfigError> {
        let mut sim = Self::new(config, spawn, terrain)?;
        for frame in frames {
            sim.apply_frame(frame);
        }
        Ok(sim)
    }

    /// FNV-1a over the tick counter and the bit patterns of the body and
    /// view state. Equal hashes mean bit-identical trajectories so far.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        let body = &self.body;
        for v in [body.position, body.velocity] {
            for c in v.to_array() {
                mix(&mut h, &c.to_bits().to_le_bytes());
            }
        }
        mix(
            &mut h,
            &[
                body.on_ground as u8,
                body.jump_armed as u8,
                body.is_sprinting as u8,
            ],
        );
        mix(&mut h, &self.orientation.yaw().to_bits().to_le_bytes());
        mix(&mut h, &self.orientation.pitch().to_bits().to_le_bytes());
        h
    }
}
