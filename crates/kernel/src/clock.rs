use std::time::Instant;

/// Turns host frame timestamps into clamped frame deltas.
///
/// The first frame reports zero. Deltas are clamped to `max_delta` so a
/// stalled tab or debugger pause never turns into a tunneling-sized step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Feed a monotonic timestamp in seconds; returns the clamped delta.
    pub fn frame(&mut self, now_seconds: f64) -> f32 {
        let delta = match self.last {
            Some(last) => now_seconds - last,
            None => 0.0,
        };
        self.last = Some(now_seconds);
        if !delta.is_finite() || delta <= 0.0 {
            return 0.0;
        }
        (delta as f32).min(self.max_delta)
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Forget the previous timestamp, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// `FrameClock` driven by `std::time::Instant`.
#[derive(Debug, Clone)]
pub struct InstantClock {
    origin: Instant,
    clock: FrameClock,
}

impl InstantClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            origin: Instant::now(),
            clock: FrameClock::new(max_delta),
        }
    }

    pub fn frame(&mut self) -> f32 {
        let now = self.origin.elapsed().as_secs_f64();
        self.clock.frame(now)
    }
}
