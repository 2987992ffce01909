//! Per-frame walk controller
//!
//! One [`WalkController::tick`] per rendered frame:
//!
//! 1. read the shared input
//! 2. integrate the body's horizontal velocity toward the movement intent
//! 3. advance the gait and collect footsteps
//! 4. apply touch look, then place the camera
//! 5. sample telemetry if enabled
//!
//! Nothing in the tick path fails or blocks. A missing body or camera means
//! the host has not finished setting up; the tick is skipped.

use crate::audio::FootstepSink;
use crate::body::PhysicsBody;
use crate::camera::{CameraHandle, CameraPlacer, MoveBasis};
use crate::config::{ConfigError, StrideConfig};
use crate::gait::{FootstepEvent, GaitState, GaitSynthesizer};
use crate::locomotion::LocomotionIntegrator;
use crate::telemetry::{DebugSnapshot, Telemetry, TelemetrySink};
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;
use stride_core::{InputChannel, InputStore, Vec3};

/// Frame timing handed to [`WalkController::tick`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub dt: f32,
}

impl FrameContext {
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

/// What one tick did
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// False when the tick was skipped
    pub applied: bool,
    /// Controller time after the tick (seconds)
    pub time: f64,
    /// Sanitized frame delta
    pub dt: f32,
    pub channel: InputChannel,
    /// Body velocity written this tick
    pub velocity: Vec3,
    /// Horizontal speed (m/s)
    pub speed: f32,
    pub vertical_offset: f32,
    pub lateral_offset: f32,
    /// Camera position written this tick
    pub eye: Vec3,
    pub footsteps: SmallVec<[FootstepEvent; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<DebugSnapshot>,
}

impl TickReport {
    /// Report for a tick that did nothing
    pub fn skipped() -> Self {
        Self::default()
    }
}

/// Locomotion and head-bob controller
pub struct WalkController {
    config: StrideConfig,
    input: Arc<InputStore>,
    locomotion: LocomotionIntegrator,
    gait: GaitSynthesizer,
    placer: CameraPlacer,
    telemetry: Telemetry,
    elapsed: f64,
    footstep_sink: Option<Box<dyn FootstepSink>>,
    telemetry_sink: Option<Box<dyn TelemetrySink>>,
}

impl std::fmt::Debug for WalkController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkController")
            .field("gait", &self.gait.state())
            .field("telemetry", &self.telemetry.is_enabled())
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl WalkController {
    /// Build a controller from a validated configuration
    pub fn new(config: StrideConfig, input: Arc<InputStore>) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            locomotion: LocomotionIntegrator::new(config.movement.clone()),
            gait: GaitSynthesizer::new(config.gait.clone()),
            placer: CameraPlacer::new(&config.body, &config.look),
            telemetry: Telemetry::new(config.telemetry.enabled),
            config,
            input,
            elapsed: 0.0,
            footstep_sink: None,
            telemetry_sink: None,
        })
    }

    pub fn config(&self) -> &StrideConfig {
        &self.config
    }

    /// Shared input store the device handlers write to
    pub fn input(&self) -> &Arc<InputStore> {
        &self.input
    }

    pub fn gait_state(&self) -> GaitState {
        self.gait.state()
    }

    pub fn skipped_footsteps(&self) -> u64 {
        self.gait.skipped_footsteps()
    }

    /// Controller time (seconds)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Flip debug telemetry, returning the new state
    pub fn toggle_telemetry(&mut self) -> bool {
        self.telemetry.toggle()
    }

    pub fn set_telemetry_enabled(&mut self, enabled: bool) {
        self.telemetry.set_enabled(enabled);
    }

    pub fn set_bob_enabled(&mut self, enabled: bool) {
        self.gait.set_enabled(enabled);
    }

    pub fn set_footstep_sink(&mut self, sink: impl FootstepSink + 'static) {
        self.footstep_sink = Some(Box::new(sink));
    }

    pub fn set_telemetry_sink(&mut self, sink: impl TelemetrySink + 'static) {
        self.telemetry_sink = Some(Box::new(sink));
    }

    /// Place the body at the spawn point, at rest, just above the ground
    pub fn spawn(&self, body: &mut dyn PhysicsBody) {
        let position = self.config.body.spawn_position();
        body.set_position(position);
        body.set_linear_velocity(Vec3::ZERO);
        tracing::debug!(x = position.x, y = position.y, z = position.z, "body spawned");
    }

    /// Back to rest: gait phase and controller time cleared
    pub fn reset(&mut self) {
        self.gait.reset();
        self.elapsed = 0.0;
    }

    /// Run one frame
    pub fn tick(
        &mut self,
        ctx: &FrameContext,
        body: Option<&mut dyn PhysicsBody>,
        camera: Option<&mut dyn CameraHandle>,
    ) -> TickReport {
        let (Some(body), Some(camera)) = (body, camera) else {
            tracing::trace!("body or camera not ready, skipping tick");
            return TickReport::skipped();
        };

        let dt = sanitize_dt(ctx.dt);
        self.elapsed += f64::from(dt);

        let input = self.input.snapshot();
        let channel = input.channel();

        let basis = MoveBasis::from_direction(camera.world_direction());
        let step = self.locomotion.step(dt, &basis, body.linear_velocity(), &input);
        body.set_linear_velocity(step.velocity);

        let max_speed = self.config.movement.max_speed;
        let gait = self.gait.advance(dt, step.velocity, basis.forward, max_speed);

        let time = self.elapsed;
        let footsteps: SmallVec<[FootstepEvent; 2]> = gait
            .footsteps
            .iter()
            .map(|&foot| FootstepEvent { foot, time })
            .collect();
        if let Some(sink) = self.footstep_sink.as_mut() {
            for event in &footsteps {
                sink.footstep(event);
            }
        }

        if channel == InputChannel::Touch {
            self.placer.apply_touch_look(camera, &self.input);
        }
        let eye = self
            .placer
            .place(camera, body.position(), gait.vertical, gait.lateral, basis.right);

        let gait_cfg = self.gait.config();
        let snapshot = self.telemetry.sample(
            &self.gait.state(),
            gait_cfg.vertical_amplitude,
            gait_cfg.lateral_amplitude,
        );
        if let (Some(snapshot), Some(sink)) = (snapshot.as_ref(), self.telemetry_sink.as_mut()) {
            sink.publish(snapshot);
        }

        TickReport {
            applied: true,
            time,
            dt,
            channel,
            velocity: step.velocity,
            speed: step.speed(),
            vertical_offset: gait.vertical,
            lateral_offset: gait.lateral,
            eye,
            footsteps,
            snapshot,
        }
    }
}

/// Negative and non-finite frame deltas count as no time passing
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}
