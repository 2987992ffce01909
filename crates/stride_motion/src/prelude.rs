//! Common imports for hosts embedding the controller

pub use crate::audio::{CuePlayer, FootstepAudio, FootstepCue, FootstepSink};
pub use crate::body::{KinematicBody, PhysicsBody};
pub use crate::camera::{CameraHandle, FirstPersonCamera, LookAngles};
pub use crate::config::{ConfigError, StrideConfig};
pub use crate::controller::{FrameContext, TickReport, WalkController};
pub use crate::devices::{KeyboardRouter, LockChange, PointerLook, TouchControls};
pub use crate::gait::{Foot, FootstepEvent};
pub use crate::session::WalkSession;
pub use crate::telemetry::{DebugSnapshot, TelemetrySink};

pub use std::sync::Arc;
pub use stride_core::{InputChannel, InputStore, MovementKey, Vec2, Vec3};
