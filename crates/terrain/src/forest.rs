use glam::Vec3;
use serde::{Deserialize, Serialize};
use treeline_common::Obstacle;
use treeline_kernel::{sample_ground, TerrainQuery};

/// Deterministic splitmix64 stream for world generation.
#[derive(Debug, Clone)]
pub struct Scatter {
    state: u64,
}

impl Scatter {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// Parameters for scattering trees and rocks over a square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub seed: u64,
    /// Objects land within `[-extent, extent]` on both axes.
    pub extent: f32,
    /// Nothing is placed in the `[-clearing, clearing]` square around the origin.
    pub clearing: f32,
    pub trees: usize,
    pub rocks: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            extent: 48.0,
            clearing: 5.0,
            trees: 40,
            rocks: 20,
        }
    }
}

/// Rocks smaller than this scale are decoration only.
const ROCK_COLLIDE_SCALE: f32 = 0.3;
/// Rejection-sampling bound for one placement.
const MAX_PLACEMENT_ATTEMPTS: usize = 64;

impl ForestConfig {
    /// Trunk and rock cylinders standing on `ground`.
    ///
    /// Same seed and ground, same obstacles in the same order.
    pub fn scatter(&self, ground: &impl TerrainQuery) -> Vec<Obstacle> {
        let mut rng = Scatter::new(self.seed);
        let mut out = Vec::with_capacity(self.trees + self.rocks);
        let base = |x: f32, z: f32| Vec3::new(x, sample_ground(ground, x, z), z);

        for _ in 0..self.trees {
            let Some((x, z)) = self.spot(&mut rng) else {
                tracing::debug!(seed = self.seed, "no room outside the clearing, skipping tree");
                continue;
            };
            let scale = rng.range(0.8, 1.6);
            out.push(Obstacle::cylinder(base(x, z), 0.3 * scale, 3.0 * scale));
        }

        for _ in 0..self.rocks {
            let Some((x, z)) = self.spot(&mut rng) else {
                continue;
            };
            let scale = rng.range(0.2, 0.6);
            if scale > ROCK_COLLIDE_SCALE {
                out.push(Obstacle::cylinder(base(x, z), 0.9 * scale, 1.5 * scale));
            }
        }

        tracing::debug!(
            seed = self.seed,
            placed = out.len(),
            "forest scattered"
        );
        out
    }

    fn spot(&self, rng: &mut Scatter) -> Option<(f32, f32)> {
        (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
            let x = rng.range(-self.extent, self.extent);
            let z = rng.range(-self.extent, self.extent);
            (x.abs() >= self.clearing || z.abs() >= self.clearing).then_some((x, z))
        })
    }
}
