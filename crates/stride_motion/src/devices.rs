//! Device routing
//!
//! Translates raw platform events into the shared [`InputStore`] and the
//! camera rotation:
//!
//! - [`KeyboardRouter`] - bound movement keys and the telemetry toggle
//! - [`TouchControls`] - left half of the viewport is a virtual joystick,
//!   right half is a look-drag area
//! - [`PointerLook`] - pointer lock state and mouse look while locked

use crate::camera::{apply_look, CameraHandle};
use crate::config::{KeyBindings, LookConfig, TouchConfig};
use rustc_hash::FxHashMap;
use stride_core::{InputChannel, InputStore, MovementKey, Vec2};
use stride_platform::{KeyboardEvent, PlatformError, PointerMotion, TouchEvent};

// ============================================================================
// Keyboard
// ============================================================================

/// What a key event did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Not bound
    None,
    /// A movement key changed state
    Movement(MovementKey, bool),
    /// The telemetry toggle was pressed
    ToggleTelemetry,
}

#[derive(Clone, Debug, Default)]
pub struct KeyboardRouter {
    bindings: KeyBindings,
}

impl KeyboardRouter {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Apply a key event to the store
    pub fn handle(&self, event: &KeyboardEvent, input: &InputStore) -> KeyAction {
        let pressed = event.is_pressed();
        let b = &self.bindings;

        let movement = if event.key == b.forward {
            Some(MovementKey::Forward)
        } else if event.key == b.back {
            Some(MovementKey::Back)
        } else if event.key == b.strafe_left {
            Some(MovementKey::StrafeLeft)
        } else if event.key == b.strafe_right {
            Some(MovementKey::StrafeRight)
        } else {
            None
        };

        if let Some(key) = movement {
            input.set_key(key, pressed);
            return KeyAction::Movement(key, pressed);
        }

        if event.key == b.debug_toggle && pressed && !event.repeat {
            return KeyAction::ToggleTelemetry;
        }

        KeyAction::None
    }
}

// ============================================================================
// Touch
// ============================================================================

/// What a tracked touch is doing
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchRole {
    /// Owns the joystick, anchored where it started
    Joystick { origin: Vec2 },
    /// Owns the look area, with its last seen position
    Look { last: Vec2 },
}

/// Virtual joystick and look-drag zones
#[derive(Clone, Debug)]
pub struct TouchControls {
    config: TouchConfig,
    viewport_width: f32,
    touches: FxHashMap<u64, TouchRole>,
}

impl TouchControls {
    pub fn new(config: TouchConfig, viewport_width: f32) -> Self {
        Self {
            config,
            viewport_width,
            touches: FxHashMap::default(),
        }
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Role of a tracked touch
    pub fn role(&self, id: u64) -> Option<TouchRole> {
        self.touches.get(&id).copied()
    }

    fn zone_taken(&self, joystick: bool) -> bool {
        self.touches
            .values()
            .any(|role| matches!(role, TouchRole::Joystick { .. }) == joystick)
    }

    /// Apply a touch event, returning whether a zone consumed it
    pub fn handle(&mut self, event: &TouchEvent, input: &InputStore) -> bool {
        match *event {
            TouchEvent::Started { id, x, y } => {
                let joystick = x < self.viewport_width * 0.5;
                if self.touches.contains_key(&id) || self.zone_taken(joystick) {
                    return false;
                }
                let at = Vec2::new(x, y);
                let role = if joystick {
                    input.set_move_axes(0.0, 0.0);
                    TouchRole::Joystick { origin: at }
                } else {
                    TouchRole::Look { last: at }
                };
                self.touches.insert(id, role);
                true
            }
            TouchEvent::Moved { id, x, y } => {
                let at = Vec2::new(x, y);
                match self.touches.get_mut(&id) {
                    Some(TouchRole::Joystick { origin }) => {
                        let axes = joystick_axes(&self.config, at - *origin);
                        input.set_move_axes(axes.x, axes.y);
                        true
                    }
                    Some(TouchRole::Look { last }) => {
                        let delta = (at - *last) * self.config.look_sensitivity;
                        *last = at;
                        input.add_look_delta(delta.x, delta.y);
                        true
                    }
                    None => false,
                }
            }
            TouchEvent::Ended { id, .. } | TouchEvent::Cancelled { id } => {
                match self.touches.remove(&id) {
                    Some(TouchRole::Joystick { .. }) => {
                        input.set_move_axes(0.0, 0.0);
                        true
                    }
                    Some(TouchRole::Look { .. }) => true,
                    None => false,
                }
            }
        }
    }

    /// Joystick vector for a finger offset in pixels
    ///
    /// Screen up is forward. The offset is clamped to the stick radius and
    /// scaled down linearly inside the dead zone.
    pub fn joystick_axes(&self, offset: Vec2) -> Vec2 {
        joystick_axes(&self.config, offset)
    }

    /// Forget every touch, zeroing the joystick
    pub fn clear(&mut self, input: &InputStore) {
        if self
            .touches
            .values()
            .any(|role| matches!(role, TouchRole::Joystick { .. }))
        {
            input.set_move_axes(0.0, 0.0);
        }
        self.touches.clear();
    }
}

fn joystick_axes(config: &TouchConfig, offset: Vec2) -> Vec2 {
    let dist = offset.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }
    let radius = config.max_radius.max(1.0);
    let reach = dist.min(radius) / radius;
    let dead = (dist / config.dead_zone.max(1.0)).min(1.0);
    let scale = reach * dead / dist;
    Vec2::new(offset.x * scale, -offset.y * scale)
}

// ============================================================================
// Pointer lock
// ============================================================================

/// Pointer lock transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockChange {
    pub locked: bool,
}

type LockListener = Box<dyn Fn(&LockChange) + Send + Sync>;

/// Pointer lock collaborator for keyboard/mouse play
pub struct PointerLook {
    channel: InputChannel,
    locked: bool,
    pending: bool,
    sensitivity: f32,
    pitch_limit: f32,
    listeners: Vec<LockListener>,
}

impl std::fmt::Debug for PointerLook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerLook")
            .field("channel", &self.channel)
            .field("locked", &self.locked)
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PointerLook {
    pub fn new(look: &LookConfig, channel: InputChannel) -> Self {
        Self {
            channel,
            locked: false,
            pending: false,
            sensitivity: look.pointer_sensitivity,
            pitch_limit: look.pitch_limit(),
            listeners: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether a lock was requested but the host has not confirmed it
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Follow the active input channel; switching to touch drops the lock
    pub fn set_channel(&mut self, channel: InputChannel) {
        self.channel = channel;
        if channel == InputChannel::Touch {
            self.pending = false;
            self.on_lock_changed(false);
        }
    }

    /// Register a lock change listener
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&LockChange) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Ask the host to capture the pointer
    ///
    /// The lock takes effect when the host confirms it through
    /// [`PointerLook::on_lock_changed`].
    pub fn request_lock(&mut self) -> stride_platform::Result<()> {
        if self.channel == InputChannel::Touch {
            return Err(PlatformError::Unsupported(
                "pointer lock is not available with touch controls".to_string(),
            ));
        }
        if !self.locked {
            self.pending = true;
        }
        Ok(())
    }

    /// Release the pointer
    pub fn unlock(&mut self) {
        self.pending = false;
        self.on_lock_changed(false);
    }

    /// Host notification of the current lock state
    ///
    /// Listeners only hear real transitions.
    pub fn on_lock_changed(&mut self, locked: bool) {
        self.pending = false;
        if self.locked == locked {
            return;
        }
        self.locked = locked;
        tracing::debug!(locked, "pointer lock changed");

        let change = LockChange { locked };
        for listener in &self.listeners {
            listener(&change);
        }
    }

    /// Rotate the camera from relative pointer motion while locked
    pub fn handle_motion(&self, motion: &PointerMotion, camera: &mut dyn CameraHandle) -> bool {
        if !self.locked {
            return false;
        }
        apply_look(
            camera,
            Vec2::new(motion.dx, motion.dy),
            self.sensitivity,
            self.pitch_limit,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FirstPersonCamera;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use stride_platform::Key;

    fn touch() -> TouchControls {
        TouchControls::new(TouchConfig::default(), 800.0)
    }

    #[test]
    fn test_keyboard_routes_bindings() {
        let router = KeyboardRouter::default();
        let input = InputStore::new();

        assert_eq!(
            router.handle(&KeyboardEvent::pressed(Key::W), &input),
            KeyAction::Movement(MovementKey::Forward, true)
        );
        router.handle(&KeyboardEvent::pressed(Key::D), &input);
        assert!(input.keys().forward && input.keys().right);

        router.handle(&KeyboardEvent::released(Key::W), &input);
        assert!(!input.keys().forward);

        assert_eq!(
            router.handle(&KeyboardEvent::pressed(Key::B), &input),
            KeyAction::ToggleTelemetry
        );
        assert_eq!(
            router.handle(&KeyboardEvent::released(Key::B), &input),
            KeyAction::None
        );
        assert_eq!(
            router.handle(&KeyboardEvent::pressed(Key::Q), &input),
            KeyAction::None
        );
    }

    #[test]
    fn test_held_toggle_key_fires_once() {
        let router = KeyboardRouter::default();
        let input = InputStore::new();
        let mut held = KeyboardEvent::pressed(Key::B);
        held.repeat = true;
        assert_eq!(router.handle(&held, &input), KeyAction::None);
    }

    #[test]
    fn test_joystick_radius_and_dead_zone() {
        let controls = touch();

        // Past the radius: clamped to unit length
        let axes = controls.joystick_axes(Vec2::new(0.0, -120.0));
        assert!((axes.y - 1.0).abs() < 1e-6);
        assert_eq!(axes.x, 0.0);

        // Inside the dead zone: 4px of 8 halves the output
        let axes = controls.joystick_axes(Vec2::new(4.0, 0.0));
        assert!((axes.x - (4.0 / 60.0) * 0.5).abs() < 1e-6);

        // Between dead zone and radius: linear
        let axes = controls.joystick_axes(Vec2::new(30.0, 0.0));
        assert!((axes.x - 0.5).abs() < 1e-6);

        assert_eq!(controls.joystick_axes(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_joystick_touch_lifecycle() {
        let mut controls = touch();
        let input = InputStore::new();

        assert!(controls.handle(&TouchEvent::Started { id: 1, x: 100.0, y: 500.0 }, &input));
        controls.handle(&TouchEvent::Moved { id: 1, x: 100.0, y: 440.0 }, &input);
        assert!((input.move_axes().y - 1.0).abs() < 1e-6);

        // A second finger on the left half is ignored
        assert!(!controls.handle(&TouchEvent::Started { id: 2, x: 50.0, y: 500.0 }, &input));
        assert!(!controls.handle(&TouchEvent::Moved { id: 2, x: 50.0, y: 900.0 }, &input));
        assert!((input.move_axes().y - 1.0).abs() < 1e-6);

        // Releasing the owning touch zeroes the stick
        assert!(controls.handle(&TouchEvent::Cancelled { id: 1 }, &input));
        assert_eq!(input.move_axes(), Vec2::ZERO);
        assert_eq!(controls.role(1), None);
    }

    #[test]
    fn test_look_drag_accumulates_per_touch() {
        let mut controls = touch();
        let input = InputStore::new();

        controls.handle(&TouchEvent::Started { id: 7, x: 600.0, y: 300.0 }, &input);
        controls.handle(&TouchEvent::Moved { id: 7, x: 610.0, y: 295.0 }, &input);
        controls.handle(&TouchEvent::Moved { id: 7, x: 625.0, y: 300.0 }, &input);

        // Another finger on the right half does not steer
        controls.handle(&TouchEvent::Started { id: 8, x: 700.0, y: 300.0 }, &input);
        controls.handle(&TouchEvent::Moved { id: 8, x: 900.0, y: 300.0 }, &input);

        assert_eq!(input.consume_look_delta(), Vec2::new(25.0, 0.0));

        controls.handle(&TouchEvent::Ended { id: 7, x: 625.0, y: 300.0 }, &input);
        assert!(controls.handle(&TouchEvent::Started { id: 8, x: 700.0, y: 300.0 }, &input));
        controls.handle(&TouchEvent::Moved { id: 8, x: 690.0, y: 310.0 }, &input);
        assert_eq!(input.consume_look_delta(), Vec2::new(-10.0, 10.0));
    }

    #[test]
    fn test_lock_notifies_only_on_transitions() {
        let mut look = PointerLook::new(&LookConfig::default(), InputChannel::Keyboard);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        look.subscribe(move |change| sink.lock().unwrap().push(change.locked));

        look.request_lock().unwrap();
        assert!(look.is_pending());
        look.on_lock_changed(true);
        look.on_lock_changed(true);
        look.unlock();
        look.unlock();

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_lock_unsupported_on_touch() {
        let mut look = PointerLook::new(&LookConfig::default(), InputChannel::Touch);
        assert!(matches!(look.request_lock(), Err(PlatformError::Unsupported(_))));
    }

    #[test]
    fn test_switching_to_touch_releases_lock() {
        let mut look = PointerLook::new(&LookConfig::default(), InputChannel::Keyboard);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        look.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        look.on_lock_changed(true);
        look.set_channel(InputChannel::Touch);
        assert!(!look.is_locked());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pointer_motion_only_while_locked() {
        let mut look = PointerLook::new(&LookConfig::default(), InputChannel::Keyboard);
        let mut camera = FirstPersonCamera::default();
        let motion = PointerMotion::new(100.0, 0.0);

        assert!(!look.handle_motion(&motion, &mut camera));
        assert_eq!(camera.angles.yaw, 0.0);

        look.on_lock_changed(true);
        assert!(look.handle_motion(&motion, &mut camera));
        assert!((camera.angles.yaw + 0.2).abs() < 1e-6);
    }
}
