//! Terrain: concrete `TerrainQuery` implementations for the controller.
//!
//! # Invariants
//! - Queries are pure; all randomness is spent at scene build time.
//! - A height source answers `None` outside its generated bounds and the
//!   kernel substitutes flat ground.
//! - Obstacle queries return obstacles in insertion order.

mod forest;
mod grid;
mod ground;
mod scene;

pub use forest::{ForestConfig, Scatter};
pub use grid::{CellCoord, ObstacleGrid, DEFAULT_CELL_SIZE};
pub use ground::{FlatTerrain, Ground, HeightField, WaveTerrain};
pub use scene::{Landscape, SceneConfig};

/// Errors from building terrain or loading a scene description.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("height field spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),
    #[error("height field needs at least 2x2 samples, got {columns}x{rows}")]
    TooFewSamples { columns: usize, rows: usize },
    #[error("height field expects {expected} samples, got {got}")]
    SampleCount { expected: usize, got: usize },
    #[error("height sample {index} is not finite")]
    NonFiniteSample { index: usize },
    #[error("obstacle {index} has a non-positive or non-finite extent")]
    InvalidObstacle { index: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
