//! Shared input store
//!
//! Device handlers (keyboard, virtual joystick, touch look-drag) write here;
//! the simulation tick reads here once per frame. Look deltas use drain
//! semantics: [`InputStore::consume_look_delta`] returns everything
//! accumulated since the previous drain and resets the accumulator in the
//! same critical section, so every unit of drag is applied exactly once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stride_core::input::{InputChannel, InputStore};
//!
//! let store = Arc::new(InputStore::new());
//!
//! // Touch handlers
//! store.set_touch_mode(true);
//! store.set_move_axes(0.0, 2.0); // clamped to 1.0
//! store.add_look_delta(4.0, -1.0);
//! store.add_look_delta(1.0, 0.5);
//!
//! // Simulation tick
//! assert_eq!(store.channel(), InputChannel::Touch);
//! assert_eq!(store.move_axes().y, 1.0);
//! let look = store.consume_look_delta();
//! assert_eq!((look.x, look.y), (5.0, -0.5));
//! assert!(store.consume_look_delta().is_zero());
//! ```

use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Which device family the integrator trusts this tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputChannel {
    /// Keyboard movement, pointer-lock mouse look
    #[default]
    Keyboard,
    /// Virtual joystick movement, touch-drag look
    Touch,
}

/// The four movement keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

/// Movement key states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    /// Check if any movement key is held
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    fn set(&mut self, key: MovementKey, pressed: bool) {
        match key {
            MovementKey::Forward => self.forward = pressed,
            MovementKey::Back => self.back = pressed,
            MovementKey::StrafeLeft => self.left = pressed,
            MovementKey::StrafeRight => self.right = pressed,
        }
    }
}

/// Copy of the store contents at one instant
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Joystick vector, x = strafe (right positive), y = forward
    pub move_axes: Vec2,
    /// Look drag accumulated since the last drain (pixels)
    pub look_delta: Vec2,
    /// Whether touch controls are the active channel
    pub touch_mode: bool,
    /// Keyboard movement flags
    pub keys: MovementKeys,
}

impl InputSnapshot {
    pub fn channel(&self) -> InputChannel {
        if self.touch_mode {
            InputChannel::Touch
        } else {
            InputChannel::Keyboard
        }
    }
}

/// Process-wide input state shared by device handlers and the tick
///
/// All operations take `&self`; share it with `Arc<InputStore>`.
#[derive(Debug, Default)]
pub struct InputStore {
    state: Mutex<InputSnapshot>,
}

impl InputStore {
    /// Create an empty store (keyboard channel, no input)
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InputSnapshot> {
        // A panicking writer cannot leave the plain-data snapshot half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the joystick vector, clamping each component to [-1, 1]
    pub fn set_move_axes(&self, x: f32, y: f32) {
        let mut state = self.lock();
        state.move_axes = Vec2::new(clamp_axis(x), clamp_axis(y));
    }

    /// Non-destructive read of the joystick vector
    pub fn move_axes(&self) -> Vec2 {
        self.lock().move_axes
    }

    /// Accumulate look drag
    pub fn add_look_delta(&self, dx: f32, dy: f32) {
        let mut state = self.lock();
        state.look_delta += Vec2::new(dx, dy);
    }

    /// Drain the look accumulator
    pub fn consume_look_delta(&self) -> Vec2 {
        let mut state = self.lock();
        std::mem::take(&mut state.look_delta)
    }

    /// Select the touch channel
    ///
    /// Leaving touch mode zeroes the joystick so a stale vector cannot keep
    /// driving the body after the on-screen stick goes away.
    pub fn set_touch_mode(&self, on: bool) {
        let mut state = self.lock();
        if state.touch_mode != on {
            tracing::debug!(touch = on, "input channel changed");
        }
        state.touch_mode = on;
        if !on {
            state.move_axes = Vec2::ZERO;
        }
    }

    pub fn is_touch_mode(&self) -> bool {
        self.lock().touch_mode
    }

    /// Active channel for this tick
    pub fn channel(&self) -> InputChannel {
        self.lock().channel()
    }

    /// Record a movement key press or release
    pub fn set_key(&self, key: MovementKey, pressed: bool) {
        self.lock().keys.set(key, pressed);
    }

    pub fn keys(&self) -> MovementKeys {
        self.lock().keys
    }

    /// Copy everything without draining
    pub fn snapshot(&self) -> InputSnapshot {
        *self.lock()
    }

    /// Clear all input (teardown, focus loss)
    pub fn reset(&self) {
        *self.lock() = InputSnapshot::default();
    }
}

fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_move_axes_clamped_and_replaced() {
        let store = InputStore::new();
        store.set_move_axes(3.0, -7.5);
        assert_eq!(store.move_axes(), Vec2::new(1.0, -1.0));

        // Last write wins, no accumulation
        store.set_move_axes(0.25, 0.5);
        assert_eq!(store.move_axes(), Vec2::new(0.25, 0.5));

        store.set_move_axes(f32::NAN, f32::INFINITY);
        assert_eq!(store.move_axes(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_consume_look_delta_drains() {
        let store = InputStore::new();
        store.add_look_delta(1.5, -2.0);
        store.add_look_delta(0.5, 4.0);
        store.add_look_delta(-10.0, 0.0);

        let first = store.consume_look_delta();
        assert_eq!(first, Vec2::new(-8.0, 2.0));

        let second = store.consume_look_delta();
        assert_eq!(second, Vec2::ZERO);
    }

    #[test]
    fn test_move_axes_read_is_non_destructive() {
        let store = InputStore::new();
        store.set_move_axes(0.3, 0.4);
        assert_eq!(store.move_axes(), store.move_axes());
    }

    #[test]
    fn test_leaving_touch_mode_zeroes_axes() {
        let store = InputStore::new();
        store.set_touch_mode(true);
        store.set_move_axes(0.5, 0.5);
        assert_eq!(store.channel(), InputChannel::Touch);

        store.set_touch_mode(false);
        assert_eq!(store.channel(), InputChannel::Keyboard);
        assert_eq!(store.move_axes(), Vec2::ZERO);
    }

    #[test]
    fn test_keys() {
        let store = InputStore::new();
        assert!(!store.keys().any());
        store.set_key(MovementKey::Forward, true);
        store.set_key(MovementKey::StrafeRight, true);
        store.set_key(MovementKey::Forward, false);

        let keys = store.keys();
        assert!(!keys.forward);
        assert!(keys.right);
        assert!(keys.any());

        store.reset();
        assert_eq!(store.snapshot(), InputSnapshot::default());
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(InputStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        store.add_look_delta(1.0, -1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.consume_look_delta(), Vec2::new(4000.0, -4000.0));
    }
}
