use serde::{Deserialize, Serialize};
use treeline_common::ControllerConfig;
use treeline_kernel::Simulation;
use treeline_terrain::{Ground, Landscape, SceneConfig};

use crate::store::StoreError;

/// Bumped whenever the on-disk shape of `Recording` changes.
pub const RECORDING_SCHEMA_VERSION: u32 = 1;

/// One recorded host frame: `dt`, sampled intent, pointer delta.
pub use treeline_kernel::InputFrame as RecordedFrame;

/// A captured run: setup plus the exact frame stream that drove it.
///
/// The spawn point and forest seed live in `scene`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub schema_version: u32,
    pub config: ControllerConfig,
    pub scene: SceneConfig,
    pub frames: Vec<RecordedFrame>,
    /// Ticks the run had executed when it ended.
    pub ticks: u64,
    /// `Simulation::state_hash` at the end of the run.
    pub final_hash: u64,
}

impl Recording {
    /// Run `frames` from scratch and capture the outcome.
    pub fn capture(
        config: ControllerConfig,
        scene: SceneConfig,
        frames: Vec<RecordedFrame>,
    ) -> Result<Self, StoreError> {
        let sim = replay_frames(&config, &scene, &frames)?;
        tracing::debug!(
            frames = frames.len(),
            ticks = sim.tick_count(),
            "recording captured"
        );
        Ok(Self {
            schema_version: RECORDING_SCHEMA_VERSION,
            ticks: sim.tick_count(),
            final_hash: sim.state_hash(),
            config,
            scene,
            frames,
        })
    }

    /// Rebuild the simulation this recording describes, after the last frame.
    pub fn replay(&self) -> Result<Simulation<Landscape<Ground>>, StoreError> {
        replay_frames(&self.config, &self.scene, &self.frames)
    }

    /// Replay and compare against the stored outcome.
    pub fn verify(&self) -> Result<Simulation<Landscape<Ground>>, StoreError> {
        if self.schema_version != RECORDING_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                file_version: self.schema_version,
                expected_version: RECORDING_SCHEMA_VERSION,
            });
        }
        let sim = self.replay()?;
        let actual = sim.state_hash();
        if actual != self.final_hash || sim.tick_count() != self.ticks {
            return Err(StoreError::ReplayDiverged {
                expected: self.final_hash,
                actual,
            });
        }
        Ok(sim)
    }

    /// Seconds of host time covered by the frames.
    pub fn duration(&self) -> f32 {
        self.frames.iter().map(|f| f.dt).sum()
    }
}

fn replay_frames(
    config: &ControllerConfig,
    scene: &SceneConfig,
    frames: &[RecordedFrame],
) -> Result<Simulation<Landscape<Ground>>, StoreError> {
    let landscape = scene.build()?;
    Ok(Simulation::replay(
        config.clone(),
        scene.spawn,
        landscape,
        frames,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use treeline_common::MovementIntent;
    use treeline_terrain::{FlatTerrain, ForestConfig};

    fn scene() -> SceneConfig {
        SceneConfig {
            spawn: Vec3::new(0.0, 1.0, 0.0),
            ground: Ground::Flat(FlatTerrain::new(0.0)),
            forest: Some(ForestConfig {
                trees: 10,
                rocks: 5,
                extent: 12.0,
                ..ForestConfig::default()
            }),
            ..SceneConfig::default()
        }
    }

    fn frames() -> Vec<RecordedFrame> {
        (0..180)
            .map(|i| {
                let intent = MovementIntent::new(Vec2::new(0.3, -1.0), i == 30, i > 90);
                RecordedFrame::new(1.0 / 60.0, intent).with_look(Vec2::new(2.0, 0.0))
            })
            .collect()
    }

    #[test]
    fn capture_then_verify() {
        let rec = Recording::capture(ControllerConfig::default(), scene(), frames()).unwrap();
        assert_eq!(rec.schema_version, RECORDING_SCHEMA_VERSION);
        assert!(rec.ticks > 0);
        let sim = rec.verify().unwrap();
        assert_eq!(sim.state_hash(), rec.final_hash);
        assert!((rec.duration() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn tampered_frames_diverge() {
        let mut rec = Recording::capture(ControllerConfig::default(), scene(), frames()).unwrap();
        rec.frames[10].intent = MovementIntent::IDLE;
        assert!(matches!(rec.verify(), Err(StoreError::ReplayDiverged { .. })));
    }

    #[test]
    fn wrong_schema_rejected() {
        let mut rec = Recording::capture(ControllerConfig::default(), scene(), Vec::new()).unwrap();
        rec.schema_version = 99;
        assert!(matches!(
            rec.verify(),
            Err(StoreError::SchemaMismatch { file_version: 99, .. })
        ));
    }

    #[test]
    fn invalid_config_surfaces_as_error() {
        let config = ControllerConfig {
            gravity: -1.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            Recording::capture(config, scene(), frames()),
            Err(StoreError::Config(_))
        ));
    }
}
