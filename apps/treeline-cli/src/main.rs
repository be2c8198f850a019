use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use tracing_subscriber::EnvFilter;
use treeline_common::{ControllerConfig, MovementIntent};
use treeline_input::{IntentSource, ScriptedIntent};
use treeline_kernel::{InputFrame, SimEvent, Simulation};
use treeline_persist::{Recording, RecordingStore};
use treeline_render::{CameraRig, CameraSink, DebugTextSink, FirstPersonCamera, FollowCamera};
use treeline_terrain::SceneConfig;

#[derive(Parser)]
#[command(name = "treeline", about = "Headless character controller runs and replays")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default settings
    Info,
    /// Print the default controller config, or validate a config file
    Config {
        /// YAML file to validate
        #[arg(long)]
        check: Option<PathBuf>,
    },
    /// Drive a body with a scripted input stream and print its state
    Simulate {
        #[command(flatten)]
        run: RunArgs,
        /// Camera used for the eye column
        #[arg(long, value_enum, default_value = "follow")]
        camera: CameraKind,
        /// Print one status line every N frames
        #[arg(long, default_value = "30")]
        every: usize,
    },
    /// Run a scripted input stream and save it to a store
    Record {
        /// Recording name (letters, digits, '-' and '_')
        name: String,
        /// Store directory
        #[arg(long, default_value = "recordings")]
        store: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Load a recording, replay it and compare the final state hash
    Replay {
        name: String,
        #[arg(long, default_value = "recordings")]
        store: PathBuf,
    },
    /// List recordings in a store and check its integrity chain
    List {
        #[arg(long, default_value = "recordings")]
        store: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Controller config YAML (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scene YAML (default forest when omitted)
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Input script to play
    #[arg(long, value_enum, default_value = "tour")]
    script: Script,
    /// Number of host frames
    #[arg(short, long, default_value = "600")]
    frames: usize,
    /// Host frame duration in seconds
    #[arg(long, default_value = "0.016666668")]
    dt: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum CameraKind {
    Follow,
    FirstPerson,
}

#[derive(Clone, Copy, ValueEnum)]
enum Script {
    /// Stand still and settle onto the ground
    Idle,
    /// Walk straight ahead
    Walk,
    /// Walk, jump, then sprint in a turning arc
    Tour,
}

impl Script {
    /// Per-frame intents and pointer deltas.
    fn frames(self, count: usize, dt: f32) -> Vec<InputFrame> {
        let forward = MovementIntent::walk(Vec2::new(0.0, -1.0));
        let mut source = match self {
            Script::Idle => ScriptedIntent::repeat(MovementIntent::IDLE, count),
            Script::Walk => ScriptedIntent::repeat(forward, count),
            Script::Tour => {
                let quarter = count / 4;
                ScriptedIntent::repeat(forward, quarter)
                    .then(MovementIntent::new(Vec2::new(0.0, -1.0), true, false), 1)
                    .then(forward, quarter.saturating_sub(1))
                    .then(MovementIntent::new(Vec2::new(0.5, -1.0), false, true), quarter)
                    .then(MovementIntent::IDLE, count - 3 * quarter)
            }
        };
        let turning = matches!(self, Script::Tour);
        (0..count)
            .map(|i| {
                let intent = source.sample_intent();
                source.advance();
                let look = if turning && intent.sprint && i % 2 == 0 {
                    Vec2::new(6.0, 0.0)
                } else {
                    Vec2::ZERO
                };
                InputFrame::new(dt, intent).with_look(look)
            })
            .collect()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = ControllerConfig::default();
            let scene = SceneConfig::default();
            println!("treeline v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", treeline_common::crate_info());
            println!(
                "step: {:.5}s (cap {} ticks/frame, max frame {:.2}s)",
                config.fixed_step_seconds, config.max_ticks_per_frame, config.max_frame_delta
            );
            println!(
                "body: radius {} height {} walk {} sprint {} jump {}",
                config.body_radius,
                config.body_height,
                config.walk_speed,
                config.sprint_speed,
                config.jump_force
            );
            println!(
                "default scene: {} ground, spawn {:?}, forest seed {}",
                scene.ground.describe(),
                scene.spawn,
                scene.forest.as_ref().map_or(0, |f| f.seed)
            );
        }
        Commands::Config { check } => match check {
            Some(path) => {
                let config = ControllerConfig::load(&path)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                println!("{}: OK", path.display());
                print!("{}", config.to_yaml()?);
            }
            None => print!("{}", ControllerConfig::default().to_yaml()?),
        },
        Commands::Simulate { run, camera, every } => match camera {
            CameraKind::Follow => simulate(&run, FollowCamera::default(), every)?,
            CameraKind::FirstPerson => simulate(&run, FirstPersonCamera::default(), every)?,
        },
        Commands::Record { name, store, run } => {
            let (config, scene) = load_setup(&run)?;
            let frames = run.script.frames(run.frames, run.dt);
            let recording = Recording::capture(config, scene, frames)?;
            let mut store = RecordingStore::open(&store)
                .with_context(|| format!("opening store {}", store.display()))?;
            store.save(&name, &recording)?;
            println!(
                "Recorded '{name}': frames={}, ticks={}, hash={:#018x}",
                recording.frames.len(),
                recording.ticks,
                recording.final_hash
            );
        }
        Commands::Replay { name, store } => {
            let store = RecordingStore::open(&store)
                .with_context(|| format!("opening store {}", store.display()))?;
            let recording = store.load(&name)?;
            println!(
                "Replaying '{name}': frames={}, duration={:.2}s",
                recording.frames.len(),
                recording.duration()
            );
            let sim = recording.verify()?;
            let body = sim.snapshot();
            println!(
                "Match: OK ticks={} hash={:#018x} final=({:.2}, {:.2}, {:.2})",
                sim.tick_count(),
                sim.state_hash(),
                body.position.x,
                body.position.y,
                body.position.z
            );
        }
        Commands::List { store } => {
            let store = RecordingStore::open(&store)
                .with_context(|| format!("opening store {}", store.display()))?;
            store.verify_integrity()?;
            for name in store.list() {
                println!("{name}");
            }
            println!("{} recording(s), integrity OK", store.meta().recording_count);
        }
    }

    Ok(())
}

fn load_setup(run: &RunArgs) -> anyhow::Result<(ControllerConfig, SceneConfig)> {
    let config = match &run.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    let scene = match &run.scene {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => SceneConfig::default(),
    };
    Ok((config, scene))
}

fn simulate<R: CameraRig>(run: &RunArgs, rig: R, every: usize) -> anyhow::Result<()> {
    let (config, scene) = load_setup(run)?;
    let landscape = scene.build()?;
    let mut sim = Simulation::new(config, scene.spawn, landscape)?;
    let mut sink = DebugTextSink::new(rig);
    let every = every.max(1);

    let frames = run.script.frames(run.frames, run.dt);
    for (i, frame) in frames.iter().enumerate() {
        sim.apply_frame(frame);
        for event in sim.drain_events() {
            match event {
                SimEvent::Ticked { .. } => {}
                SimEvent::Landed { tick, position } => {
                    println!("  tick {tick:>5}: landed at y={:.2}", position.y)
                }
                SimEvent::Jumped { tick, .. } => println!("  tick {tick:>5}: jumped"),
                SimEvent::Respawned { tick, from, to } => println!(
                    "  tick {tick:>5}: respawned from y={:.2} to ({:.1}, {:.1}, {:.1})",
                    from.y, to.x, to.y, to.z
                ),
                SimEvent::StepOverload { tick, dropped } => {
                    println!("  tick {tick:>5}: overload, dropped {dropped:.3}s")
                }
            }
        }
        if i % every == 0 || i + 1 == frames.len() {
            println!("{}", sink.present(&sim.snapshot(), sim.orientation()));
        }
    }

    println!(
        "Done: frames={}, lines={}, ticks={}, hash={:#018x}",
        frames.len(),
        sink.frames(),
        sim.tick_count(),
        sim.state_hash()
    );
    Ok(())
}
