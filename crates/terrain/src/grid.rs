use glam::Vec3;
use std::collections::HashMap;
use treeline_common::Obstacle;

use crate::TerrainError;

/// Cell edge used when no size is configured.
pub const DEFAULT_CELL_SIZE: f32 = 8.0;

/// A 2D cell coordinate in the obstacle grid (Y is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Fixed-size grid over the XZ plane for static obstacles.
///
/// Each obstacle is registered in every cell its footprint touches, so a
/// query only has to look at the cells its own circle touches.
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    cell_size: f32,
    obstacles: Vec<Obstacle>,
    cells: HashMap<CellCoord, Vec<u32>>,
}

impl Default for ObstacleGrid {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            obstacles: Vec::new(),
            cells: HashMap::new(),
        }
    }
}

impl ObstacleGrid {
    pub fn new(cell_size: f32) -> Result<Self, TerrainError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(TerrainError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            obstacles: Vec::new(),
            cells: HashMap::new(),
        })
    }

    /// Build a grid holding `obstacles`, in order.
    pub fn from_obstacles(
        cell_size: f32,
        obstacles: impl IntoIterator<Item = Obstacle>,
    ) -> Result<Self, TerrainError> {
        let mut grid = Self::new(cell_size)?;
        for obstacle in obstacles {
            grid.insert(obstacle)?;
        }
        Ok(grid)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn position_to_cell(&self, pos: Vec3) -> CellCoord {
        CellCoord {
            x: (pos.x / self.cell_size).floor() as i32,
            z: (pos.z / self.cell_size).floor() as i32,
        }
    }

    /// Add an obstacle. Rejects non-finite positions and empty shapes.
    pub fn insert(&mut self, obstacle: Obstacle) -> Result<(), TerrainError> {
        let index = self.obstacles.len();
        let extent = obstacle.horizontal_extent();
        let (bottom, top) = obstacle.vertical_span();
        if !(obstacle.position.is_finite() && extent.is_finite() && extent > 0.0 && top > bottom) {
            return Err(TerrainError::InvalidObstacle { index });
        }
        let (min, max) = self.cell_range(obstacle.position, extent);
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                self.cells
                    .entry(CellCoord::new(x, z))
                    .or_default()
                    .push(index as u32);
            }
        }
        self.obstacles.push(obstacle);
        Ok(())
    }

    /// Obstacles whose footprint comes within `radius` of `position` on the
    /// XZ plane, in insertion order.
    pub fn query(&self, position: Vec3, radius: f32) -> Vec<Obstacle> {
        if !position.is_finite() || !radius.is_finite() {
            return Vec::new();
        }
        let (min, max) = self.cell_range(position, radius.max(0.0));
        let mut hits: Vec<u32> = Vec::new();
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                if let Some(indices) = self.cells.get(&CellCoord::new(x, z)) {
                    hits.extend(indices);
                }
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter()
            .map(|i| self.obstacles[i as usize])
            .filter(|o| {
                let dx = position.x - o.position.x;
                let dz = position.z - o.position.z;
                dx.hypot(dz) <= radius + o.horizontal_extent()
            })
            .collect()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of obstacle placements across all cells.
    pub fn total_placements(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    fn cell_range(&self, center: Vec3, reach: f32) -> (CellCoord, CellCoord) {
        let min = self.position_to_cell(center - Vec3::new(reach, 0.0, reach));
        let max = self.position_to_cell(center + Vec3::new(reach, 0.0, reach));
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(x: f32, z: f32) -> Obstacle {
        Obstacle::cylinder(Vec3::new(x, 0.0, z), 0.5, 4.0)
    }

    #[test]
    fn position_to_cell_basic() {
        let grid = ObstacleGrid::new(16.0).unwrap();
        assert_eq!(
            grid.position_to_cell(Vec3::new(10.0, 0.0, 10.0)),
            CellCoord::new(0, 0)
        );
        assert_eq!(
            grid.position_to_cell(Vec3::new(20.0, 0.0, -5.0)),
            CellCoord::new(1, -1)
        );
    }

    #[test]
    fn invalid_cell_size_rejected() {
        assert!(ObstacleGrid::new(0.0).is_err());
        assert!(ObstacleGrid::new(f32::NAN).is_err());
    }

    #[test]
    fn obstacle_on_cell_border_lands_in_both_cells() {
        let grid = ObstacleGrid::from_obstacles(4.0, [tree(4.0, 1.0)]).unwrap();
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.total_placements(), 2);
    }

    #[test]
    fn query_finds_neighbours_across_cells() {
        let grid = ObstacleGrid::from_obstacles(4.0, [tree(4.3, 0.0), tree(20.0, 20.0)]).unwrap();
        let near = grid.query(Vec3::new(3.5, 0.0, 0.0), 0.4);
        assert_eq!(near, vec![tree(4.3, 0.0)]);
    }

    #[test]
    fn query_filters_by_true_distance() {
        let grid = ObstacleGrid::from_obstacles(16.0, [tree(3.0, 0.0)]).unwrap();
        // Same cell, but too far away.
        assert!(grid.query(Vec3::ZERO, 1.0).is_empty());
        assert_eq!(grid.query(Vec3::ZERO, 2.5).len(), 1);
    }

    #[test]
    fn query_preserves_insertion_order() {
        let obstacles = [tree(1.0, 0.0), tree(-1.0, 0.0), tree(0.0, 1.0)];
        let grid = ObstacleGrid::from_obstacles(1.0, obstacles).unwrap();
        assert_eq!(grid.query(Vec3::ZERO, 1.0), obstacles.to_vec());
    }

    #[test]
    fn degenerate_obstacle_rejected() {
        let mut grid = ObstacleGrid::new(8.0).unwrap();
        let flat = Obstacle::cylinder(Vec3::ZERO, 0.5, 0.0);
        assert!(matches!(
            grid.insert(flat),
            Err(TerrainError::InvalidObstacle { index: 0 })
        ));
        assert!(grid.is_empty());
    }

    #[test]
    fn empty_grid_returns_nothing() {
        let grid = ObstacleGrid::new(16.0).unwrap();
        assert!(grid.query(Vec3::new(99.0, 0.0, 99.0), 5.0).is_empty());
        assert!(grid.query(Vec3::splat(f32::NAN), 5.0).is_empty());
    }
}
