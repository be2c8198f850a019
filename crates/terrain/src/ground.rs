use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use treeline_common::Obstacle;
use treeline_kernel::TerrainQuery;

use crate::TerrainError;

/// Infinite level ground.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TerrainQuery for FlatTerrain {
    fn ground_height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }

    fn obstacles_near(&self, _position: Vec3, _radius: f32) -> Vec<Obstacle> {
        Vec::new()
    }
}

/// Gentle rolling hills, `sin(x f) cos(z f) a`, fading to zero at `extent`
/// from the origin. Undefined outside the `extent` square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTerrain {
    pub amplitude: f32,
    pub frequency: f32,
    /// Half-width of the generated square.
    pub extent: f32,
}

impl Default for WaveTerrain {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            frequency: 0.05,
            extent: 50.0,
        }
    }
}

impl TerrainQuery for WaveTerrain {
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        if x.abs() > self.extent || z.abs() > self.extent {
            return None;
        }
        let wave = (x * self.frequency).sin() * (z * self.frequency).cos() * self.amplitude;
        let fade = (1.0 - x.hypot(z) / self.extent).max(0.0);
        Some(wave * fade)
    }

    fn obstacles_near(&self, _position: Vec3, _radius: f32) -> Vec<Obstacle> {
        Vec::new()
    }
}

/// Regular grid of height samples with bilinear interpolation between them.
///
/// Sample `(c, r)` sits at `origin + (c, r) * spacing` on the XZ plane and is
/// stored row-major. Columns outside the grid have no height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    origin: Vec2,
    spacing: f32,
    columns: usize,
    rows: usize,
    heights: Vec<f32>,
}

impl HeightField {
    pub fn new(
        origin: Vec2,
        spacing: f32,
        columns: usize,
        rows: usize,
        heights: Vec<f32>,
    ) -> Result<Self, TerrainError> {
        let field = Self {
            origin,
            spacing,
            columns,
            rows,
            heights,
        };
        field.validate()?;
        Ok(field)
    }

    /// Sample `f(x, z)` at every grid point.
    pub fn from_fn(
        origin: Vec2,
        spacing: f32,
        columns: usize,
        rows: usize,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, TerrainError> {
        let mut heights = Vec::with_capacity(columns * rows);
        for r in 0..rows {
            for c in 0..columns {
                heights.push(f(
                    origin.x + c as f32 * spacing,
                    origin.y + r as f32 * spacing,
                ));
            }
        }
        Self::new(origin, spacing, columns, rows, heights)
    }

    /// Check the invariants a deserialized field may have broken.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(TerrainError::InvalidSpacing(self.spacing));
        }
        if self.columns < 2 || self.rows < 2 {
            return Err(TerrainError::TooFewSamples {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let expected = self.columns.saturating_mul(self.rows);
        if self.heights.len() != expected {
            return Err(TerrainError::SampleCount {
                expected,
                got: self.heights.len(),
            });
        }
        if let Some(index) = self.heights.iter().position(|h| !h.is_finite()) {
            return Err(TerrainError::NonFiniteSample { index });
        }
        Ok(())
    }

    /// Far corner of the sampled rectangle.
    pub fn max_corner(&self) -> Vec2 {
        self.origin
            + Vec2::new(
                self.columns.saturating_sub(1) as f32 * self.spacing,
                self.rows.saturating_sub(1) as f32 * self.spacing,
            )
    }

    fn at(&self, c: usize, r: usize) -> Option<f32> {
        self.heights.get(r * self.columns + c).copied()
    }
}

impl TerrainQuery for HeightField {
    /// `None` off the grid, and everywhere on a field too small or too short
    /// of samples to interpolate.
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        let expected = self.columns.checked_mul(self.rows);
        if self.columns < 2 || self.rows < 2 || expected != Some(self.heights.len()) {
            return None;
        }
        let gx = (x - self.origin.x) / self.spacing;
        let gz = (z - self.origin.y) / self.spacing;
        let max_c = (self.columns - 1) as f32;
        let max_r = (self.rows - 1) as f32;
        if !(0.0..=max_c).contains(&gx) || !(0.0..=max_r).contains(&gz) {
            return None;
        }
        // Clamp the cell so the far edge interpolates inside the last cell.
        let c = (gx.floor() as usize).min(self.columns - 2);
        let r = (gz.floor() as usize).min(self.rows - 2);
        let tx = gx - c as f32;
        let tz = gz - r as f32;
        let (h00, h10) = (self.at(c, r)?, self.at(c + 1, r)?);
        let (h01, h11) = (self.at(c, r + 1)?, self.at(c + 1, r + 1)?);
        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * tz)
    }

    fn obstacles_near(&self, _position: Vec3, _radius: f32) -> Vec<Obstacle> {
        Vec::new()
    }
}

/// Any of the height sources, selectable from a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ground {
    Flat(FlatTerrain),
    Waves(WaveTerrain),
    Field(HeightField),
}

impl Default for Ground {
    fn default() -> Self {
        Ground::Waves(WaveTerrain::default())
    }
}

impl Ground {
    pub fn validate(&self) -> Result<(), TerrainError> {
        match self {
            Ground::Field(field) => field.validate(),
            Ground::Flat(_) | Ground::Waves(_) => Ok(()),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Ground::Flat(_) => "flat",
            Ground::Waves(_) => "waves",
            Ground::Field(_) => "height field",
        }
    }
}

impl TerrainQuery for Ground {
    fn ground_height_at(&self, x: f32, z: f32) -> Option<f32> {
        match self {
            Ground::Flat(t) => t.ground_height_at(x, z),
            Ground::Waves(t) => t.ground_height_at(x, z),
            Ground::Field(t) => t.ground_height_at(x, z),
        }
    }

    fn obstacles_near(&self, _position: Vec3, _radius: f32) -> Vec<Obstacle> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_is_everywhere() {
        let flat = FlatTerrain::new(2.5);
        assert_eq!(flat.ground_height_at(1e6, -1e6), Some(2.5));
    }

    #[test]
    fn waves_vanish_at_origin_and_edges() {
        let waves = WaveTerrain::default();
        assert_eq!(waves.ground_height_at(0.0, 0.0), Some(0.0));
        assert_eq!(waves.ground_height_at(50.0, 0.0), Some(0.0));
        assert_eq!(waves.ground_height_at(50.1, 0.0), None);
        let h = waves.ground_height_at(20.0, 3.0).unwrap();
        assert!(h > 0.0 && h < waves.amplitude);
    }

    #[test]
    fn height_field_interpolates_bilinearly() {
        // z = 0 row: 0, 2; z = 1 row: 4, 6.
        let field = HeightField::new(Vec2::ZERO, 1.0, 2, 2, vec![0.0, 2.0, 4.0, 6.0]).unwrap();
        assert_eq!(field.ground_height_at(0.0, 0.0), Some(0.0));
        assert_eq!(field.ground_height_at(1.0, 1.0), Some(6.0));
        assert_eq!(field.ground_height_at(0.5, 0.5), Some(3.0));
        assert_eq!(field.ground_height_at(1.0, 0.0), Some(2.0));
    }

    #[test]
    fn height_field_has_no_samples_outside() {
        let field = HeightField::from_fn(Vec2::new(-2.0, -2.0), 1.0, 5, 5, |x, z| x + z).unwrap();
        assert_eq!(field.max_corner(), Vec2::new(2.0, 2.0));
        assert!(field.ground_height_at(2.5, 0.0).is_none());
        assert!(field.ground_height_at(0.0, -2.01).is_none());
        assert!(field.ground_height_at(f32::NAN, 0.0).is_none());
        let h = field.ground_height_at(1.5, -0.25).unwrap();
        assert!((h - 1.25).abs() < 1e-5);
    }

    #[test]
    fn bad_height_fields_rejected() {
        assert!(matches!(
            HeightField::new(Vec2::ZERO, 1.0, 2, 2, vec![0.0; 3]),
            Err(TerrainError::SampleCount { expected: 4, got: 3 })
        ));
        assert!(matches!(
            HeightField::new(Vec2::ZERO, 0.0, 2, 2, vec![0.0; 4]),
            Err(TerrainError::InvalidSpacing(_))
        ));
        assert!(matches!(
            HeightField::new(Vec2::ZERO, 1.0, 1, 4, vec![0.0; 4]),
            Err(TerrainError::TooFewSamples { .. })
        ));
        assert!(matches!(
            HeightField::new(Vec2::ZERO, 1.0, 2, 2, vec![0.0, f32::NAN, 0.0, 0.0]),
            Err(TerrainError::NonFiniteSample { index: 1 })
        ));
    }

    #[test]
    fn unvalidated_field_reads_as_missing() {
        let tiny: Ground = serde_yaml::from_str(
            "kind: field\norigin: [0.0, 0.0]\nspacing: 1.0\ncolumns: 1\nrows: 1\nheights: [3.0]\n",
        )
        .unwrap();
        assert!(tiny.validate().is_err());
        assert_eq!(tiny.ground_height_at(0.0, 0.0), None);

        let short: Ground = serde_yaml::from_str(
            "kind: field\norigin: [0.0, 0.0]\nspacing: 1.0\ncolumns: 3\nrows: 2\nheights: [1.0, 2.0]\n",
        )
        .unwrap();
        assert!(short.validate().is_err());
        assert_eq!(short.ground_height_at(1.5, 0.5), None);

        if let Ground::Field(field) = &tiny {
            assert_eq!(field.max_corner(), Vec2::ZERO);
        }
    }

    #[test]
    fn ground_enum_parses_from_yaml() {
        let ground: Ground = serde_yaml::from_str("kind: flat\nheight: 1.5\n").unwrap();
        assert_eq!(ground, Ground::Flat(FlatTerrain::new(1.5)));
        let waves: Ground = serde_yaml::from_str("kind: waves\namplitude: 2.0\n").unwrap();
        assert_eq!(waves.describe(), "waves");
        assert_eq!(waves.ground_height_at(0.0, 0.0), Some(0.0));
    }
}
