//! Stride CLI
//!
//! Headless walk simulation and configuration tooling.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use stride_motion::{
    FirstPersonCamera, Foot, FootstepAudio, FootstepCue, KinematicBody, PhysicsBody, StrideConfig,
    WalkSession,
};
use stride_platform::ControlFlow;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod export;
mod script;

use export::TelemetryExport;
use script::{Script, ScriptedEventLoop};

/// Linear damping of the simulated rigid body (1/s)
const BODY_DAMPING: f32 = 4.0;

#[derive(Parser)]
#[command(name = "stride")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "First-person locomotion controller harness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted walk without a window
    Simulate {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated duration in seconds
        #[arg(short, long, default_value = "10")]
        seconds: f32,

        /// Fixed frame delta in seconds
        #[arg(long, default_value = "0.0166667")]
        dt: f32,

        /// Input pattern to play
        #[arg(long, value_enum, default_value = "forward")]
        script: Script,

        /// Write every tick report, plus bob overlay curves and markers, as
        /// JSON lines to this file
        #[arg(short, long)]
        telemetry: Option<PathBuf>,

        /// Disable the head bob
        #[arg(long)]
        no_bob: bool,
    },

    /// Print the default configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            config,
            seconds,
            dt,
            script,
            telemetry,
            no_bob,
        } => cmd_simulate(SimulateArgs {
            config,
            seconds,
            dt,
            script,
            telemetry: export::telemetry_path(telemetry),
            no_bob,
        }),

        Commands::Config { output } => cmd_config(output.as_deref()),

        Commands::Check { path } => cmd_check(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<StrideConfig> {
    match path {
        Some(path) => {
            let config = StrideConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(StrideConfig::default()),
    }
}

struct SimulateArgs {
    config: Option<PathBuf>,
    seconds: f32,
    dt: f32,
    script: Script,
    telemetry: Option<PathBuf>,
    no_bob: bool,
}

#[derive(Debug, Default)]
struct Summary {
    frames: u64,
    distance: f32,
    max_speed: f32,
    left: u64,
    right: u64,
}

fn cmd_simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let event_loop = ScriptedEventLoop::new(args.script, args.seconds, args.dt)?;

    info!(
        "Simulating {:?} for {}s at dt={} ({} frames)",
        args.script,
        args.seconds,
        args.dt,
        event_loop.frames()
    );

    let script = args.script;
    let mut session: WalkSession<KinematicBody, FirstPersonCamera> =
        WalkSession::new(config.clone(), &script.capabilities(), script.viewport_width())
            .context("Invalid configuration")?;

    let cues: Arc<Mutex<Vec<FootstepCue>>> = Arc::default();
    let played = cues.clone();
    let audio = FootstepAudio::new(config.audio.clone(), move |cue: &FootstepCue| {
        if let Ok(mut played) = played.lock() {
            played.push(cue.clone());
        }
    });

    let controller = session.controller_mut();
    controller.set_footstep_sink(audio);
    if args.no_bob {
        controller.set_bob_enabled(false);
    }

    let mut writer = match &args.telemetry {
        Some(path) => {
            session.controller_mut().set_telemetry_enabled(true);
            if !session.controller().telemetry().is_enabled() {
                warn!("Built without debug telemetry; reports will carry no gait snapshots");
            }
            Some(TelemetryExport::create(
                path,
                config.telemetry.curve_samples,
            )?)
        }
        None => None,
    };

    session.on_lock_change(|change| tracing::debug!(locked = change.locked, "pointer lock"));
    if script.capabilities().is_touch() {
        info!("Touch controls active");
    } else {
        session.pointer_mut().request_lock()?;
    }

    let ground = config.body.spawn_position().y;
    session.attach_body(
        KinematicBody::new(config.body.spawn_position())
            .with_rest_height(ground)
            .with_linear_damping(BODY_DAMPING),
    );
    session.attach_camera(FirstPersonCamera::default());

    let mut summary = Summary::default();
    let mut write_error = None;

    session.run(event_loop, |session, report| {
        summary.frames += 1;
        summary.max_speed = summary.max_speed.max(report.speed);
        summary.distance += report.speed * report.dt;
        for step in &report.footsteps {
            match step.foot {
                Foot::Left => summary.left += 1,
                Foot::Right => summary.right += 1,
            }
        }

        if let Some(body) = session.body_mut() {
            body.step(report.dt);
        }

        if let Some(out) = writer.as_mut() {
            if let Err(err) = out.record(report) {
                write_error = Some(err);
                return ControlFlow::Exit;
            }
        }
        ControlFlow::Continue
    })?;

    if let Some(err) = write_error {
        return Err(err.context("Failed to write telemetry"));
    }
    if let Some(out) = writer {
        let lines = out.lines();
        out.finish()?;
        if let Some(path) = &args.telemetry {
            info!("Wrote {} telemetry lines to {}", lines, path.display());
        }
    }

    let position = session.body().map(|b| b.position()).unwrap_or_default();
    let yaw = session.camera().map(|c| c.angles.yaw).unwrap_or_default();
    let cue_count = cues.lock().map(|c| c.len()).unwrap_or_default();

    info!("Frames:      {}", summary.frames);
    info!("Distance:    {:.2} m", summary.distance);
    info!("Max speed:   {:.2} m/s", summary.max_speed);
    info!(
        "Final body:  ({:.2}, {:.2}, {:.2}), yaw {:.2} rad",
        position.x, position.y, position.z, yaw
    );
    info!(
        "Footsteps:   {} left, {} right, {} audio cues",
        summary.left, summary.right, cue_count
    );

    let skipped = session.controller().skipped_footsteps();
    if skipped > 0 {
        warn!(
            "{} footsteps folded away by frames spanning more than a gait cycle",
            skipped
        );
    }

    Ok(())
}

fn cmd_config(output: Option<&Path>) -> Result<()> {
    let toml = StrideConfig::default()
        .to_toml_string()
        .context("Failed to serialize default config")?;

    match output {
        Some(path) => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            fs::write(path, toml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Default config written to {}", path.display());
        }
        None => print!("{toml}"),
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    // Loading parses and range-checks every field
    let config = StrideConfig::load(path)
        .with_context(|| format!("{} is not a valid config", path.display()))?;

    info!("Config OK: {}", path.display());
    info!(
        "  speed {} m/s, cadence {}..{} Hz, bob {}",
        config.movement.max_speed,
        config.gait.min_cadence_hz,
        config.gait.max_cadence_hz,
        if config.gait.enabled { "on" } else { "off" }
    );
    Ok(())
}
