use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use treeline_common::Obstacle;
use treeline_kernel::TerrainQuery;

use crate::forest::ForestConfig;
use crate::grid::{ObstacleGrid, DEFAULT_CELL_SIZE};
use crate::ground::Ground;
use crate::TerrainError;

/// A height source plus partitioned static obstacles.
#[derive(Debug, Clone)]
pub struct Landscape<G> {
    ground: G,
    grid: ObstacleGrid,
}

impl<G: TerrainQuery> Landscape<G> {
    pub fn new(ground: G, grid: ObstacleGrid) -> Self {
        Self { ground, grid }
    }

    /// Ground only, no obstacles.
    pub fn bare(ground: G) -> Self {
        Self {
            ground,
            grid: ObstacleGrid::default(),
        }
    }

    pub fn ground(&self) -> &G {
        &self.ground
    }

    pub fn grid(&self) -> &ObstacleGrid {
        &self.grid
    }
}

impl<G: TerrainQuery> TerrainQuery for Landscape<G> {
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.ground.ground_height_at(x, z)
    }

    fn obstacles_near(&self, position: Vec3, radius: f32) -> Vec<Obstacle> {
        let mut near = self.ground.obstacles_near(position, radius);
        near.extend(self.grid.query(position, radius));
        near
    }
}

/// Everything needed to rebuild a world: ground, scattered forest,
/// hand-placed obstacles and the spawn point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub spawn: Vec3,
    pub ground: Ground,
    pub forest: Option<ForestConfig>,
    /// Cabins, platforms, fences.
    pub obstacles: Vec<Obstacle>,
    pub cell_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(0.0, 1.0, 0.0),
            ground: Ground::default(),
            forest: Some(ForestConfig::default()),
            obstacles: Vec::new(),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, TerrainError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, TerrainError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the ground, scatter the forest and partition every obstacle.
    pub fn build(&self) -> Result<Landscape<Ground>, TerrainError> {
        self.ground.validate()?;
        let scattered = self
            .forest
            .as_ref()
            .map(|forest| forest.scatter(&self.ground))
            .unwrap_or_default();
        let grid = ObstacleGrid::from_obstacles(
            self.cell_size,
            self.obstacles.iter().copied().chain(scattered),
        )?;
        tracing::info!(
            ground = self.ground.describe(),
            obstacles = grid.len(),
            cells = grid.cell_count(),
            "scene built"
        );
        Ok(Landscape::new(self.ground.clone(), grid))
    }
}
