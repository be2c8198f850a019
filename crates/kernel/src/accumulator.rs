/// Ticks owed for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepBudget {
    /// Number of fixed ticks to run now.
    pub ticks: u32,
    /// Seconds discarded because the tick cap was hit.
    pub dropped: f32,
}

impl StepBudget {
    pub fn overloaded(&self) -> bool {
        self.dropped > 0.0
    }
}

/// Converts variable frame deltas into whole fixed ticks.
///
/// The remainder below one step is carried to the next frame. When a frame
/// owes more than `max_ticks` ticks, the excess is dropped (the simulation
/// runs slower than wall time) instead of spiralling.
#[derive(Debug, Clone)]
pub struct FixedStepAccumulator {
    tick_rate: f64,
    tick_accumulator: f64,
    max_frame_delta: f32,
    max_ticks: u32,
}

impl FixedStepAccumulator {
    /// `step` and `max_frame_delta` must be positive; `ControllerConfig::validate`
    /// guarantees this for config-driven construction.
    pub fn new(step: f32, max_frame_delta: f32, max_ticks: u32) -> Self {
        Self {
            tick_rate: step as f64,
            tick_accumulator: 0.0,
            max_frame_delta,
            max_ticks,
        }
    }

    pub fn from_config(config: &treeline_common::ControllerConfig) -> Self {
        Self::new(
            config.fixed_step_seconds,
            config.max_frame_delta,
            config.max_ticks_per_frame,
        )
    }

    /// Add a frame delta and report how many ticks to run.
    pub fn advance(&mut self, frame_delta: f32) -> StepBudget {
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.max_frame_delta)
        } else {
            0.0
        };
        self.tick_accumulator += delta as f64;

        let owed = (self.tick_accumulator / self.tick_rate).floor();
        self.tick_accumulator = (self.tick_accumulator - owed * self.tick_rate).max(0.0);

        let owed = owed as u64;
        if owed > self.max_ticks as u64 {
            let excess = owed - self.max_ticks as u64;
            let dropped = (excess as f64 * self.tick_rate) as f32;
            tracing::debug!(owed, cap = self.max_ticks, dropped, "step overload, dropping time");
            StepBudget {
                ticks: self.max_ticks,
                dropped,
            }
        } else {
            StepBudget {
                ticks: owed as u32,
                dropped: 0.0,
            }
        }
    }

    /// Fraction of a step currently carried, in `[0, 1)`. Useful for render
    /// interpolation between the last two ticks.
    pub fn alpha(&self) -> f32 {
        (self.tick_accumulator / self.tick_rate) as f32
    }

    pub fn step(&self) -> f32 {
        self.tick_rate as f32
    }

    pub fn reset(&mut self) {
        self.tick_accumulator = 0.0;
    }
}
