//! Camera handle and placement
//!
//! The camera sits at eye height above the body's feet, displaced by the
//! gait offsets: vertically along world up, sideways along the current
//! right vector. Rotation is a separate channel. With keyboard input the
//! pointer-lock collaborator turns the camera; with touch input the placer
//! drains the shared look delta once per tick.

use crate::config::{BodyConfig, LookConfig};
use stride_core::{InputStore, Quat, Vec2, Vec3};

/// Yaw/pitch pair in radians
///
/// Applied in "YXZ" order: yaw around world up, then pitch around the local
/// right axis. Zero looks down -Z; positive pitch looks up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_yaw_pitch(self.yaw, self.pitch)
    }
}

/// Camera handle consumed by the controller
pub trait CameraHandle {
    fn position(&self) -> Vec3;

    fn set_position(&mut self, position: Vec3);

    fn rotation(&self) -> LookAngles;

    fn set_rotation(&mut self, angles: LookAngles);

    /// Unit vector the camera is looking along
    fn world_direction(&self) -> Vec3 {
        self.rotation().direction()
    }
}

/// Plain first-person camera
#[derive(Clone, Debug, Default)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub angles: LookAngles,
}

impl FirstPersonCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            angles: LookAngles::default(),
        }
    }

    /// Orientation for a renderer
    pub fn orientation(&self) -> Quat {
        self.angles.to_quat()
    }
}

impl CameraHandle for FirstPersonCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> LookAngles {
        self.angles
    }

    fn set_rotation(&mut self, angles: LookAngles) {
        self.angles = angles;
    }
}

/// Turn a camera by a pixel delta: yaw first, then pitch, clamped
///
/// Dragging right turns right and dragging down looks down.
pub fn apply_look(camera: &mut dyn CameraHandle, delta: Vec2, sensitivity: f32, pitch_limit: f32) {
    let mut angles = camera.rotation();
    angles.yaw -= delta.x * sensitivity;
    angles.pitch = (angles.pitch - delta.y * sensitivity).clamp(-pitch_limit, pitch_limit);
    camera.set_rotation(angles);
}

/// Horizontal facing and right vectors derived from a view direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveBasis {
    /// Flattened, normalized view direction (zero if looking straight up/down)
    pub forward: Vec3,
    /// `forward × up`, normalized
    pub right: Vec3,
}

impl MoveBasis {
    pub fn from_direction(direction: Vec3) -> Self {
        let forward = direction.horizontal().normalize();
        let right = forward.cross(Vec3::UP).normalize();
        Self { forward, right }
    }
}

/// Places the camera relative to the body
#[derive(Clone, Debug)]
pub struct CameraPlacer {
    eye_height: f32,
    feet_offset: f32,
    touch_sensitivity: f32,
    pitch_limit: f32,
}

impl CameraPlacer {
    pub fn new(body: &BodyConfig, look: &LookConfig) -> Self {
        Self {
            eye_height: body.eye_height,
            feet_offset: body.feet_offset(),
            touch_sensitivity: look.touch_sensitivity,
            pitch_limit: look.pitch_limit(),
        }
    }

    /// Eye position for a body center and gait offsets
    pub fn eye_position(&self, body: Vec3, vertical: f32, lateral: f32, right: Vec3) -> Vec3 {
        let lift = self.eye_height - self.feet_offset + vertical;
        let mut eye = body + Vec3::UP * lift;
        if lateral != 0.0 {
            eye += right * lateral;
        }
        eye
    }

    /// Write the eye position to the camera
    pub fn place(
        &self,
        camera: &mut dyn CameraHandle,
        body: Vec3,
        vertical: f32,
        lateral: f32,
        right: Vec3,
    ) -> Vec3 {
        let eye = self.eye_position(body, vertical, lateral, right);
        camera.set_position(eye);
        eye
    }

    /// Drain touch look drag into the camera rotation
    ///
    /// Returns the drained delta.
    pub fn apply_touch_look(&self, camera: &mut dyn CameraHandle, input: &InputStore) -> Vec2 {
        let delta = input.consume_look_delta();
        if !delta.is_zero() {
            apply_look(camera, delta, self.touch_sensitivity, self.pitch_limit);
        }
        delta
    }
}
