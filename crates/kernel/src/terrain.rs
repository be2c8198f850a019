use glam::Vec3;
use treeline_common::Obstacle;

/// Ground height used when the terrain has no sample for a column.
pub const FLAT_FALLBACK_HEIGHT: f32 = 0.0;

/// Read-only world geometry the controller collides against.
///
/// Implementations must be deterministic: the same query always yields the
/// same answer. Randomness belongs to world generation, not to queries.
pub trait TerrainQuery {
    /// Ground height at column `(x, z)`, or `None` outside generated bounds.
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32>;

    /// Static obstacles whose footprint comes within `radius` of `position`
    /// on the horizontal plane.
    fn obstacles_near(&self, position: Vec3, radius: f32) -> Vec<Obstacle>;
}

impl<T: TerrainQuery + ?Sized> TerrainQuery for &T {
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        (**self).ground_height_at(x, z)
    }

    fn obstacles_near(&self, position: Vec3, radius: f32) -> Vec<Obstacle> {
        (**self).obstacles_near(position, radius)
    }
}

impl<T: TerrainQuery + ?Sized> TerrainQuery for Box<T> {
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        (**self).ground_height_at(x, z)
    }

    fn obstacles_near(&self, position: Vec3, radius: f32) -> Vec<Obstacle> {
        (**self).obstacles_near(position, radius)
    }
}

/// Ground height with the flat fallback applied. Never fails.
pub fn sample_ground(terrain: &(impl TerrainQuery + ?Sized), x: f32, z: f32) -> f32 {
    match terrain.ground_height_at(x, z) {
        Some(h) if h.is_finite() => h,
        _ => {
            tracing::trace!(x, z, "missing terrain sample, using flat fallback");
            FLAT_FALLBACK_HEIGHT
        }
    }
}
