//! # Stride Motion
//!
//! First-person locomotion and procedural camera motion.
//!
//! Per frame the [`WalkController`] reads the shared input, moves the
//! physics body's velocity toward the movement intent, advances a gait
//! phase accumulator that drives a head-bob offset and footstep events,
//! and places the camera at eye height.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stride_motion::prelude::*;
//!
//! let input = Arc::new(InputStore::new());
//! let mut controller = WalkController::new(StrideConfig::default(), input.clone())?;
//! controller.spawn(&mut body);
//!
//! // Device handlers write the store
//! input.set_key(MovementKey::Forward, true);
//!
//! // Once per rendered frame
//! let report = controller.tick(&FrameContext::new(dt), Some(&mut body), Some(&mut camera));
//! for step in &report.footsteps {
//!     play_footstep(step.foot);
//! }
//! ```

pub mod audio;
pub mod body;
pub mod camera;
pub mod config;
pub mod controller;
pub mod devices;
pub mod gait;
pub mod locomotion;
pub mod session;
pub mod telemetry;

pub mod prelude;

pub use audio::{CuePlayer, FootstepAudio, FootstepCue, FootstepLimiter, FootstepSink};
pub use body::{KinematicBody, PhysicsBody};
pub use camera::{CameraHandle, CameraPlacer, FirstPersonCamera, LookAngles, MoveBasis};
pub use config::{ConfigError, StrideConfig};
pub use controller::{FrameContext, TickReport, WalkController};
pub use devices::{KeyAction, KeyboardRouter, LockChange, PointerLook, TouchControls, TouchRole};
pub use gait::{Foot, FootstepEvent, GaitOutput, GaitState, GaitSynthesizer};
pub use locomotion::{move_towards, LocomotionIntegrator, LocomotionStep};
pub use session::WalkSession;
pub use telemetry::{BobCurves, DebugSnapshot, PhaseMarkers, Telemetry, TelemetrySink};
